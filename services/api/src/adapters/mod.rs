pub mod db;
pub mod pdf;

pub use db::DbAdapter;
pub use pdf::PdfRenderer;
