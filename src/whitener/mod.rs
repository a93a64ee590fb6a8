//! Funciones para eliminar información personal de documentos Office.

pub mod batch;
mod constants;
mod dispatch;
mod family;
mod inspect;
pub mod office;
mod utils;

pub use dispatch::remove_personal_info;
pub use family::DocumentFamily;
pub use inspect::{PrivacyReport, inspect_document};
