pub mod connection;
pub mod document_store;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use document_store::CsvDocumentStore;
