/*!
Logical navigation targets.

These are what the session store and the access guard point at; the `inter`
module is what actually turns them into redirects.
*/
use crate::user::Role;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Route {
    Landing,
    Login,
    Dashboard(Role),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_owned(),
            Route::Login => "/login".to_owned(),
            Route::Dashboard(role) => format!("/{}/dashboard", role),
        }
    }

    /// Where an identity of the given role lands by default.
    pub fn landing_for(role: Role) -> Route {
        Route::Dashboard(role)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", &self.path())
    }
}
