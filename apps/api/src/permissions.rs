//! Object-level ownership checks.
//!
//! Authentication happens earlier, in the `AuthUser` extractor, so every
//! predicate here receives an already-authenticated requester.

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::company::CompanyRow;
use crate::models::user::UserRow;

/// The requester is the target record itself (profile edits).
pub fn require_self(requester: &UserRow, target_user_id: Uuid) -> Result<(), AppError> {
    if requester.id == target_user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// The requester is the record's `user` (resumes, comments, follows).
pub fn require_owner(requester: &UserRow, owner_id: Uuid) -> Result<(), AppError> {
    if requester.id == owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// The requester owns the company that published a recruitment.
pub fn require_recruitment_owner(
    requester: &UserRow,
    company_owner_id: Uuid,
) -> Result<(), AppError> {
    require_owner(requester, company_owner_id)
}

pub fn require_employer(requester: &UserRow) -> Result<(), AppError> {
    if requester.is_employer() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// The company named in a posting request must exist, belong to the
/// requester and be verified.
pub fn require_postable_company<'a>(
    requester: &UserRow,
    company: Option<&'a CompanyRow>,
) -> Result<&'a CompanyRow, AppError> {
    let company = company.ok_or(AppError::Forbidden)?;
    require_owner(requester, company.user_id)?;
    if !company.verified || !company.active {
        return Err(AppError::Forbidden);
    }
    Ok(company)
}


#[cfg(test)]
mod tests {
    use super::fixtures::{company, user};
    use super::*;
    use crate::models::user::UserRole;

    #[test]
    fn test_self_matches_only_same_id() {
        let me = user(UserRole::Seeker);
        assert!(require_self(&me, me.id).is_ok());
        assert!(matches!(
            require_self(&me, Uuid::new_v4()),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_owner_rejects_strangers() {
        let me = user(UserRole::Seeker);
        let other = user(UserRole::Seeker);
        assert!(require_owner(&me, me.id).is_ok());
        assert!(require_owner(&me, other.id).is_err());
    }

    #[test]
    fn test_unverified_company_cannot_post() {
        let me = user(UserRole::Employer);
        let mine = company(me.id, false);
        assert!(matches!(
            require_postable_company(&me, Some(&mine)),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_verified_own_company_can_post() {
        let me = user(UserRole::Employer);
        let mine = company(me.id, true);
        let allowed = require_postable_company(&me, Some(&mine)).unwrap();
        assert_eq!(allowed.id, mine.id);
    }

    #[test]
    fn test_someone_elses_verified_company_cannot_be_used() {
        let me = user(UserRole::Employer);
        let theirs = company(Uuid::new_v4(), true);
        assert!(require_postable_company(&me, Some(&theirs)).is_err());
    }

    #[test]
    fn test_missing_company_is_rejected() {
        let me = user(UserRole::Employer);
        assert!(require_postable_company(&me, None).is_err());
    }

    #[test]
    fn test_soft_deleted_company_cannot_post() {
        let me = user(UserRole::Employer);
        let mut mine = company(me.id, true);
        mine.active = false;
        assert!(require_postable_company(&me, Some(&mine)).is_err());
    }

    #[test]
    fn test_employer_check() {
        assert!(require_employer(&user(UserRole::Employer)).is_ok());
        assert!(require_employer(&user(UserRole::Seeker)).is_err());
    }
}
