//! Attribute and class names the stage reads or writes

pub const OBJECT_CLASS: &str = "objectClass";
pub const OBJECT_CATEGORY: &str = "objectCategory";
pub const OBJECT_GUID: &str = "objectGUID";
pub const SHOW_IN_ADVANCED_VIEW_ONLY: &str = "showInAdvancedViewOnly";
pub const SYSTEM_FLAGS: &str = "systemFlags";
/// Pseudo-attribute carrying a new password; absent from the schema
pub const CLEAR_TEXT_PASSWORD: &str = "clearTextPassword";

pub const TOP: &str = "top";
pub const ATTRIBUTE_SCHEMA: &str = "attributeSchema";
pub const SERVER: &str = "server";
pub const SITE: &str = "site";
pub const SERVER_CONTAINER: &str = "serverContainer";
pub const NTDS_DSA: &str = "nTDSDSA";
pub const SITE_LINK: &str = "siteLink";
pub const SITE_LINK_BRIDGE: &str = "siteLinkBridge";
pub const NTDS_CONNECTION: &str = "nTDSConnection";
