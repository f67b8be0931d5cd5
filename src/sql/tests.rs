use super::*;

#[test]
fn quote_ident_wraps_and_doubles_quotes() {
    assert_eq!(quote_ident("EMAIL"), "\"EMAIL\"");
    assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
}

#[test]
fn qualified_table_quotes_each_part() {
    assert_eq!(
        qualified_table("TFO", "TFO_SCHEMA", "ASSETMASTER"),
        "\"TFO\".\"TFO_SCHEMA\".\"ASSETMASTER\""
    );
}

#[test]
fn view_naming_convention() {
    assert_eq!(duplicate_view("PORTFOLIO"), "PORTFOLIO_duplicate_records");
    assert_eq!(clean_view("PORTFOLIO"), "PORTFOLIO_clean_view");
}

#[test]
fn count_and_preview_queries() {
    assert_eq!(
        count_query("\"ASSETMASTER\""),
        "SELECT COUNT(*) FROM \"ASSETMASTER\""
    );
    assert_eq!(
        preview_query("\"ASSETMASTER_clean_view\"", 50),
        "SELECT * FROM \"ASSETMASTER_clean_view\" LIMIT 50"
    );
}

#[test]
fn show_tables_and_describe_queries() {
    assert_eq!(
        show_tables_query("TFO", "TFO_SCHEMA"),
        "SHOW TABLES IN SCHEMA \"TFO\".\"TFO_SCHEMA\""
    );
    assert_eq!(
        describe_table_query("\"PORTFOLIO\""),
        "DESCRIBE TABLE \"PORTFOLIO\""
    );
}

#[test]
fn dmf_query_shape() {
    assert_eq!(
        dmf_query("COUNT_IF(\"EMAIL\" IS NULL)", "\"CUSTOMERS\""),
        "SELECT COUNT_IF(\"EMAIL\" IS NULL) AS \"RESULT\" FROM \"CUSTOMERS\""
    );
}
