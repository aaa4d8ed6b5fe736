use finjoin_core::{merge, normalize, parse_table_str, ColumnLabel, MergeOptions, Table};

fn table(csv: &str, name: &str) -> Table {
    parse_table_str(csv, b';', name).unwrap()
}

#[test]
fn lone_q4_replaced_by_annual_column() {
    let annual = table("m;2021;2022\nRevenue;10;12\n", "annual.csv");
    let quarterly = table("m;2022Q4\nRevenue;12\n", "quarterly.csv");

    let merged = merge(&annual, &quarterly, &MergeOptions::new());

    assert_eq!(merged.labels(), vec!["2021", "2022"]);
    assert_eq!(merged.suppressed, vec!["2022Q4"]);
}

#[test]
fn complete_year_keeps_all_quarters_then_annual() {
    let annual = table("m;2022\nRevenue;40\n", "annual.csv");
    let quarterly = table(
        "m;2022Q1;2022Q2;2022Q3;2022Q4\nRevenue;10;10;10;10\n",
        "quarterly.csv",
    );

    let merged = merge(&annual, &quarterly, &MergeOptions::new());

    assert_eq!(
        merged.labels(),
        vec!["2022Q1", "2022Q2", "2022Q3", "2022Q4", "2022"]
    );
}

#[test]
fn decimal_commas_and_thousands_separators() {
    assert_eq!(normalize("0,08"), "0.08");
    assert_eq!(normalize("1 234,50"), "1234.50");
}

#[test]
fn rows_from_both_tables_in_first_seen_order() {
    let annual = table("m;2022\nRevenue;1\nProfit;2\n", "annual.csv");
    let quarterly = table("m;2023Q1\nRevenue;1\nMargin;0,3\n", "quarterly.csv");

    let merged = merge(&annual, &quarterly, &MergeOptions::new());
    let names: Vec<&str> = merged.rows.iter().map(|r| r.name.as_str()).collect();

    assert_eq!(names, vec!["Revenue", "Profit", "Margin"]);
}

#[test]
fn ltm_is_always_the_final_column() {
    let annual = table("m;LTM;2024;2019\nRevenue;5;4;1\n", "annual.csv");
    let quarterly = table("m;2025Q1;2025Q2\nRevenue;2;3\n", "quarterly.csv");

    let merged = merge(&annual, &quarterly, &MergeOptions::new());

    assert_eq!(
        merged.labels(),
        vec!["2019", "2024", "2025Q1", "2025Q2", "LTM"]
    );
}

#[test]
fn year_groups_never_interleave() {
    let annual = table("m;2020;2021;2022;LTM\nRevenue;1;2;3;4\n", "annual.csv");
    let quarterly = table(
        "m;2022Q2;2021Q4;2020Q1;2022Q1;2020Q4;2023Q1\nRevenue;1;1;1;1;1;1\n",
        "quarterly.csv",
    );

    let merged = merge(&annual, &quarterly, &MergeOptions::new());
    let labels = merged.labels();

    assert_eq!(labels.last(), Some(&"LTM"));
    let keys: Vec<(i32, u8)> = labels[..labels.len() - 1]
        .iter()
        .map(|l| {
            let label = ColumnLabel::parse(l);
            // annual column closes its year group
            let rank = if label.quarter() == 0 { 5 } else { label.quarter() };
            (label.year().unwrap(), rank)
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert!(!labels.contains(&"2021Q4"));
    assert!(labels.contains(&"2020Q4"));
}

#[test]
fn report_dates_and_renames() {
    let annual = table(
        "m;2022;2023\nReport date;31.12.2022;31.12.2023\nNet profit;1 000,1;2 000,2\n",
        "annual.csv",
    );
    let quarterly = table("m;2024Q1\nReport date;31.03.2024\n", "quarterly.csv");

    let options = MergeOptions::new()
        .with_date_row("Report date")
        .with_rename("Net profit", "net_income");
    let merged = merge(&annual, &quarterly, &options);

    assert_eq!(merged.get("Report date", "2022"), Some("2022-12-31"));
    assert_eq!(merged.get("Report date", "2024Q1"), Some("2024-03-31"));
    assert_eq!(merged.get("net_income", "2023"), Some("2000.2"));
    assert!(merged.find_row("Net profit").is_none());
}
