/*!
Deciding whether the current session may see a role-scoped view.
*/
use crate::route::Route;
use crate::session::Session;
use crate::user::Role;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Render,
    Redirect(Route),
}

/**
Check `session` against the set of `permitted` roles.

  * no identity: go log in
  * identity of a role not in `permitted`: go to that role's own landing,
    never some other role's
  * otherwise: render

This must be called on every request into a guarded view; don't hang on
to the result.
*/
pub fn check(session: &Session, permitted: &[Role]) -> Outcome {
    let ident = match session.identity() {
        Some(ident) => ident,
        None => {
            log::trace!("guard::check( [ no session ], {:?} ): login", permitted);
            return Outcome::Redirect(Route::Login);
        },
    };

    if permitted.contains(&ident.role) {
        Outcome::Render
    } else {
        log::debug!(
            "{:?} ({}) not in {:?}; redirecting to own landing.",
            &ident.email, &ident.role, permitted
        );
        Outcome::Redirect(Route::landing_for(ident.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::mock_identities;

    fn session_as(role: Role) -> Session {
        let ident = mock_identities().into_iter()
            .find(|i| i.role == role)
            .unwrap();
        Session::with_identity(ident)
    }

    /// Every subset of the three roles, including the empty one.
    fn permitted_sets() -> Vec<Vec<Role>> {
        (0u8..8).map(|mask| {
            Role::ALL.iter().enumerate()
                .filter(|(n, _)| mask & (1 << n) != 0)
                .map(|(_, r)| *r)
                .collect()
        }).collect()
    }

    #[test]
    fn permitted_role_renders() {
        for role in Role::ALL {
            let session = session_as(role);
            for set in permitted_sets().iter().filter(|s| s.contains(&role)) {
                assert_eq!(check(&session, set), Outcome::Render);
            }
        }
    }

    #[test]
    fn other_role_goes_to_own_landing() {
        for role in Role::ALL {
            let session = session_as(role);
            for set in permitted_sets().iter().filter(|s| !s.contains(&role)) {
                assert_eq!(
                    check(&session, set),
                    Outcome::Redirect(Route::Dashboard(role)),
                    "{} guarded by {:?}", &role, set
                );
            }
        }
    }

    #[test]
    fn no_session_goes_to_login() {
        let session = Session::default();
        for set in permitted_sets().iter() {
            assert_eq!(check(&session, set), Outcome::Redirect(Route::Login));
        }
    }
}
