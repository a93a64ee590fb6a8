//! Espacios de nombres, tipos de relación y extensiones reconocidas.

pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const CP_NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
pub const APP_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
pub const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const SML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
pub const PML_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const MC_NS: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
pub const X15AC_NS: &str = "http://schemas.microsoft.com/office/spreadsheetml/2010/11/ac";

pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const CORE_PROPERTIES_REL: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const EXTENDED_PROPERTIES_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub const SETTINGS_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";

pub const WORD_EXTENSIONS: &[&str] = &["docx", "docm"];
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm"];
pub const PRESENTATION_EXTENSIONS: &[&str] = &["pptx", "pptm"];
pub const LEGACY_EXTENSIONS: &[&str] = &["doc", "xls", "ppt"];

pub const NO_EXTENSION_LABEL: &str = "sin extensión";
