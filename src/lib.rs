//! Motor de OfficeWhitener para eliminar información personal de documentos Office Open XML.
//!
//! El punto de entrada es [`remove_personal_info`], que limpia un único archivo
//! `docx`/`docm`, `xlsx`/`xlsm` o `pptx`/`pptm` en su lugar. Para lotes de archivos
//! véase el módulo [`whitener::batch`].

pub mod error;
pub mod whitener;

pub use error::{Result, WhitenError};
pub use whitener::{
    DocumentFamily, PrivacyReport, inspect_document, remove_personal_info,
};
