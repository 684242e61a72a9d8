//! Ownership-based authorization.

use super::Principal;

/// Outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Forbidden,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        self == Access::Allowed
    }
}

/// Allow the operation iff `principal` owns the resource.
pub fn check(principal: &Principal, resource_owner: &str) -> Access {
    if principal.as_str() == resource_owner {
        Access::Allowed
    } else {
        Access::Forbidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_allowed() {
        assert_eq!(check(&Principal::new("alice"), "alice"), Access::Allowed);
    }

    #[test]
    fn test_other_forbidden() {
        assert_eq!(check(&Principal::new("alice"), "bob"), Access::Forbidden);
        assert_eq!(check(&Principal::new("alice"), "Alice"), Access::Forbidden);
        assert_eq!(check(&Principal::new("alice"), ""), Access::Forbidden);
        assert!(!check(&Principal::new("alice"), "alice ").is_allowed());
    }
}
