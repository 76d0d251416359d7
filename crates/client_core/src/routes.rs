use std::fmt;

use shared::domain::UserId;

/// Screens reachable in the application. Anything that does not resolve to a
/// known screen lands on the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    List,
    Create,
    Edit(UserId),
    Detail(UserId),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path
            .split('?')
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            ["users", "create"] => Self::Create,
            ["users", "edit", id] => parse_id(id).map_or(Self::List, Self::Edit),
            ["users", id] => parse_id(id).map_or(Self::List, Self::Detail),
            _ => Self::List,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::List => "/users".to_string(),
            Self::Create => "/users/create".to_string(),
            Self::Edit(id) => format!("/users/edit/{id}"),
            Self::Detail(id) => format!("/users/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn parse_id(raw: &str) -> Option<UserId> {
    raw.parse::<i64>().ok().map(UserId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_screens() {
        assert_eq!(Route::parse("/users"), Route::List);
        assert_eq!(Route::parse("/users/"), Route::List);
        assert_eq!(Route::parse("/users/create"), Route::Create);
        assert_eq!(Route::parse("/users/edit/4"), Route::Edit(UserId(4)));
        assert_eq!(Route::parse("/users/12"), Route::Detail(UserId(12)));
        assert_eq!(Route::parse("/users/12?tab=company"), Route::Detail(UserId(12)));
    }

    #[test]
    fn root_and_unknown_paths_redirect_to_list() {
        assert_eq!(Route::parse("/"), Route::List);
        assert_eq!(Route::parse(""), Route::List);
        assert_eq!(Route::parse("/settings"), Route::List);
        assert_eq!(Route::parse("/users/abc"), Route::List);
        assert_eq!(Route::parse("/users/edit/"), Route::List);
        assert_eq!(Route::parse("/users/1/extra"), Route::List);
    }

    #[test]
    fn path_round_trips() {
        for route in [
            Route::List,
            Route::Create,
            Route::Edit(UserId(3)),
            Route::Detail(UserId(9)),
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }
}
