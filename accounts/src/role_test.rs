use super::*;

#[test]
fn parses_every_wire_name() {
    for role in Role::ALL {
        assert_eq!(role.as_str().parse::<Role>(), Ok(role));
    }
}

#[test]
fn rejects_unknown_name() {
    assert_eq!("bishop".parse::<Role>(), Err(UnknownRole("bishop".to_owned())));
}

#[test]
fn parsing_is_case_sensitive() {
    assert!("Pastor".parse::<Role>().is_err());
}

#[test]
fn unknown_role_display_names_value() {
    assert_eq!(UnknownRole("admin".into()).to_string(), "unknown role: admin");
}

#[test]
fn serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Treasurer).unwrap(), "\"treasurer\"");
    let role: Role = serde_json::from_str("\"deacon\"").unwrap();
    assert_eq!(role, Role::Deacon);
}
