//! # IO Module
//!
//! Interface layer between clients and the domain logic. It translates HTTP
//! requests into calls on the view-state services and domain errors into
//! status codes. No journal rules live here.

pub mod rest;
