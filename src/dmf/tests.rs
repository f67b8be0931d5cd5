use super::*;

#[test]
fn null_count_substitution() {
    let function = find("NULL_COUNT").expect("NULL_COUNT should exist");
    let rendered = function
        .render(Some("EMAIL"))
        .expect("Rendering should succeed");

    assert_eq!(rendered, "COUNT_IF(\"EMAIL\" IS NULL)");
}

#[test]
fn row_count_needs_no_column() {
    let function = find("ROW_COUNT").expect("ROW_COUNT should exist");

    assert!(!function.requires_column());
    assert_eq!(
        function.render(None).expect("Rendering should succeed"),
        "COUNT(*)"
    );
    // A supplied column is ignored for column-independent templates
    assert_eq!(
        function
            .render(Some("EMAIL"))
            .expect("Rendering should succeed"),
        "COUNT(*)"
    );
}

#[test]
fn missing_required_column_is_an_error() {
    let function = find("AVERAGE").expect("AVERAGE should exist");
    assert!(function.render(None).is_err());
}

#[test]
fn duplicate_count_substitutes_every_placeholder() {
    let function = find("DUPLICATE_COUNT").expect("DUPLICATE_COUNT should exist");
    let rendered = function
        .render(Some("ASSET_ID"))
        .expect("Rendering should succeed");

    assert_eq!(
        rendered,
        "COUNT(\"ASSET_ID\") - COUNT(DISTINCT \"ASSET_ID\")"
    );
}

#[test]
fn column_identifier_is_quoted() {
    let function = find("MAX").expect("MAX should exist");
    let rendered = function
        .render(Some("odd\"name"))
        .expect("Rendering should succeed");

    assert_eq!(rendered, "MAX(\"odd\"\"name\")");
}

#[test]
fn catalog_is_ordered_and_complete() {
    let names: Vec<&str> = DMF_FUNCTIONS.iter().map(|f| f.name).collect();
    assert_eq!(
        names,
        vec![
            "ROW_COUNT",
            "NULL_COUNT",
            "NOT_NULL_COUNT",
            "UNIQUE_COUNT",
            "DUPLICATE_COUNT",
            "AVERAGE",
            "SUM",
            "MIN",
            "MAX",
            "STDDEV",
            "MIN_LENGTH",
            "MAX_LENGTH",
            "AVG_LENGTH",
        ]
    );
}

#[test]
fn unknown_function_not_found() {
    assert!(find("MEDIAN").is_none());
}

#[test]
fn column_requirement_flags() {
    for function in DMF_FUNCTIONS {
        let expected = function.name != "ROW_COUNT";
        assert_eq!(function.requires_column(), expected, "{}", function.name);
    }
}
