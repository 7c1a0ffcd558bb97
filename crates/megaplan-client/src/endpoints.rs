//! Fixed endpoint paths defined by the remote service.
//!
//! These strings are part of the wire protocol and must stay
//! byte-identical to the service's documented API.

/// Password authentication; the only call made unsigned.
pub const AUTHORIZE: &str = "BumsCommonApiV01/User/authorize.api";

/// Task listing, filtered by the `Status` field.
pub const TASK_LIST: &str = "BumsTaskApiV01/Task/list.api";

/// Single task card by `Id`.
pub const TASK_CARD: &str = "BumsTaskApiV01/Task/card.api";

/// Comment listing for a subject (`SubjectType`/`SubjectId`).
pub const COMMENT_LIST: &str = "BumsCommonApiV01/Comment/list.api";

/// Reaction by notification token.
pub const REACTION_DO: &str = "SdfNotify/ReactionApi/do.api";

/// Single employee card by `Id`.
pub const EMPLOYEE_CARD: &str = "BumsStaffApiV01/Employee/card.api";

/// Employee listing.
pub const EMPLOYEE_LIST: &str = "BumsStaffApiV01/Employee/list.api";
