use nexus_finance::cli::output::{progress_bar, render_table};

#[test]
fn budget_table_renders_aligned_columns() {
    let rows = vec![
        vec![
            "Food".to_string(),
            "120.00".to_string(),
            progress_bar(40.0, 10),
        ],
        vec![
            "Rent".to_string(),
            "900.00".to_string(),
            progress_bar(135.0, 10),
        ],
    ];
    let rendered = render_table(&["Category", "Spent", "Progress"], &rows);
    insta::assert_snapshot!(rendered, @r###"
    Category  Spent   Progress
    --------  ------  ------------
    Food      120.00  [####------]
    Rent      900.00  [##########]
    "###);
}

#[test]
fn empty_table_keeps_header_and_rule() {
    let rendered = render_table(&["Id", "Title"], &[]);
    insta::assert_snapshot!(rendered, @r###"
    Id  Title
    --  -----
    "###);
}

#[test]
fn wide_characters_count_as_single_columns() {
    let rows = vec![vec!["Café".to_string(), "€".to_string()]];
    let rendered = render_table(&["Name", "Sym"], &rows);
    assert_eq!(rendered.lines().nth(2), Some("Café  €"));
}
