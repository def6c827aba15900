//! Tree sentinels and the permission letter table

use crate::model::NodeId;
use crate::permission::PermissionCode;

/// Parent id carried by root nodes; the upward walk stops here
pub const ROOT_PARENT: NodeId = -1;

/// Letter of the "no permissions" sentinel
pub const NONE_LETTER: char = '-';

// Letter table, in canonical order. The letters are the contract shared with
// the system that records assignments and must never change.
pub(crate) const LETTERS: &[(PermissionCode, char, &str)] = &[
    (PermissionCode::None, NONE_LETTER, "none"),
    (PermissionCode::CultureAndHostnames, 'I', "culture_and_hostnames"),
    (PermissionCode::AuditTrail, 'Z', "audit_trail"),
    (PermissionCode::Browse, 'F', "browse"),
    (PermissionCode::ChangeDocumentType, '7', "change_document_type"),
    (PermissionCode::Copy, 'O', "copy"),
    (PermissionCode::Delete, 'D', "delete"),
    (PermissionCode::Move, 'M', "move"),
    (PermissionCode::Create, 'C', "create"),
    (PermissionCode::PublicAccess, 'P', "public_access"),
    (PermissionCode::Unpublish, 'U', "unpublish"),
    (PermissionCode::Permissions, 'R', "permissions"),
    (PermissionCode::Rollback, 'K', "rollback"),
    (PermissionCode::SendToTranslation, '5', "send_to_translation"),
    (PermissionCode::Sort, 'S', "sort"),
    (PermissionCode::SendToPublish, 'H', "send_to_publish"),
    (PermissionCode::Translate, '4', "translate"),
    (PermissionCode::Update, 'A', "update"),
];

/// Default LMDB map size (1 GiB)
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Default LMDB reader slots
pub const DEFAULT_MAX_READERS: u32 = 126;

// Environment variables read by `StoreConfig::from_env`
pub const ENV_DB_PATH: &str = "NODEPERM_DB_PATH";
pub const ENV_MAP_SIZE: &str = "NODEPERM_MAP_SIZE";
pub const ENV_MAX_READERS: &str = "NODEPERM_MAX_READERS";
