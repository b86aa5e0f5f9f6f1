//! 도메인 모델.

mod identity;
mod role;
mod tenant;

pub use identity::{CompanyId, Identity, UserId, UserRecord};
pub use role::{Role, RoleSet};
pub use tenant::{TenantScope, TenantScopeError};
