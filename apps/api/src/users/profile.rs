//! `current-user` response. The shape depends on the role, so it is a tagged
//! union chosen once per request.

use serde::Serialize;

use crate::models::company::CompanyRow;
use crate::models::user::{UserRole, UserRow};
use crate::users::UserView;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "profile", rename_all = "snake_case")]
pub enum ProfileView {
    Seeker {
        #[serde(flatten)]
        user: UserView,
        /// Email, avatar and phone are all filled in.
        supply: bool,
        /// Has at least one active resume.
        verified: bool,
    },
    Employer {
        #[serde(flatten)]
        user: UserView,
        supply: bool,
        has_company: bool,
        /// The owned company has been verified by staff.
        verified: bool,
    },
}

pub fn has_complete_contact(user: &UserRow) -> bool {
    let filled = |v: Option<&str>| v.map(|s| !s.trim().is_empty()).unwrap_or(false);
    filled(Some(&user.email)) && filled(user.avatar_key.as_deref()) && filled(user.phone.as_deref())
}

pub fn build_profile(
    user: &UserRow,
    view: UserView,
    company: Option<&CompanyRow>,
    resume_count: i64,
) -> ProfileView {
    let supply = has_complete_contact(user);
    match user.role {
        UserRole::Employer => ProfileView::Employer {
            user: view,
            supply,
            has_company: company.is_some(),
            verified: company.map(|c| c.verified).unwrap_or(false),
        },
        UserRole::Seeker => ProfileView::Seeker {
            user: view,
            supply,
            verified: resume_count > 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::fixtures::{company, user};

    fn view_of(user: &UserRow) -> UserView {
        UserView {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            avatar: String::new(),
        }
    }

    #[test]
    fn test_employer_without_company() {
        let me = user(UserRole::Employer);
        let profile = build_profile(&me, view_of(&me), None, 0);
        match profile {
            ProfileView::Employer {
                has_company,
                verified,
                ..
            } => {
                assert!(!has_company);
                assert!(!verified);
            }
            other => panic!("expected employer profile, got {other:?}"),
        }
    }

    #[test]
    fn test_employer_with_verified_company() {
        let me = user(UserRole::Employer);
        let mine = company(me.id, true);
        let profile = build_profile(&me, view_of(&me), Some(&mine), 0);
        assert!(matches!(
            profile,
            ProfileView::Employer {
                has_company: true,
                verified: true,
                ..
            }
        ));
    }

    #[test]
    fn test_seeker_with_resume_is_verified() {
        let me = user(UserRole::Seeker);
        assert!(matches!(
            build_profile(&me, view_of(&me), None, 1),
            ProfileView::Seeker { verified: true, .. }
        ));
        assert!(matches!(
            build_profile(&me, view_of(&me), None, 0),
            ProfileView::Seeker {
                verified: false,
                ..
            }
        ));
    }

    #[test]
    fn test_supply_needs_email_avatar_and_phone() {
        let mut me = user(UserRole::Seeker);
        assert!(!has_complete_contact(&me));
        me.phone = Some("0900000000".to_string());
        me.avatar_key = Some("avatars/me.png".to_string());
        assert!(has_complete_contact(&me));
        me.email.clear();
        assert!(!has_complete_contact(&me));
    }

    #[test]
    fn test_serialized_shape_is_flat_and_tagged() {
        let me = user(UserRole::Employer);
        let json = serde_json::to_value(build_profile(&me, view_of(&me), None, 0)).unwrap();
        assert_eq!(json["profile"], "employer");
        assert_eq!(json["username"], "someone");
        assert_eq!(json["has_company"], false);
        assert_eq!(json["role"], "employer");
    }
}
