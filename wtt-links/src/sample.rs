//! Built-in sample workbooks.
//!
//! A small Western line timetable laid out the way the published WTT and
//! link summary spreadsheets are: title block, header cells, A/D flag
//! column, "Reversed as" linkage rows. Used when no input files are given
//! and as the fixture for end-to-end tests.
//!
//! The sample declares four links:
//!
//! | Link | Services | Outcome |
//! |------|----------|---------|
//! | A†   | 93001 93002 ETY3 | valid (trailing stabling tolerated), 12 cars |
//! | B    | 93003 93004 93008 | conflict: the WTT chain stops at 93004 |
//! | C    | 93005 93006 | dropped: 93006 is not in the WTT |
//! | D    | 93011 93012 | valid, AC |

use crate::grid::{Grid, Sheet, Workbook};

/// Rows above the data region of each WTT sheet.
const TITLE_ROWS: usize = 5;
/// Header cells at the top of each service column.
const HEADER_CELLS: usize = 6;
/// Rows below the last station: the "Reversed as" row plus notes.
const TRAILING_ROWS: usize = 8;

/// One service column of a sample sheet.
struct Column {
    header: &'static [&'static str],
    /// One cell per station row
    times: [&'static str; 11],
    /// UP: the reversal time on the "Reversed as" row
    reversal: &'static str,
    /// The onward service number
    onward: &'static str,
}

const UP_ROWS: [(&str, &str); 11] = [
    ("VIRAR", ""),
    ("BHAYANDAR", ""),
    ("BORIVALI", "A"),
    ("", "D"),
    ("KANDIVALI", ""),
    ("ANDHERI", ""),
    ("BANDRA", ""),
    ("MAHIM JN.", ""),
    ("DADAR", ""),
    ("MAHALAKSHMI", ""),
    ("CHURCHGATE", ""),
];

const DOWN_ROWS: [(&str, &str); 11] = [
    ("CHURCHGATE", ""),
    ("MAHALAKSHMI", ""),
    ("DADAR", "A"),
    ("", "D"),
    ("MAHIM JN.", ""),
    ("BANDRA", ""),
    ("ANDHERI", ""),
    ("KANDIVLI", ""),
    ("BORIVALI", ""),
    ("BHAYANDAR", ""),
    ("VIRAR", ""),
];

#[rustfmt::skip]
const UP_COLUMNS: [Column; 6] = [
    Column {
        header: &["93001", "12 CAR"],
        times: ["05:00", "05:10", "05:20", "05:22", "", "05:35", "05:42", "", "05:50", "", "06:05"],
        reversal: "06:15",
        onward: "93002",
    },
    Column {
        header: &["93003"],
        times: ["", "", "06:00", "06:02", "", "06:15", "", "", "06:25", "", "06:40"],
        reversal: "06:50",
        onward: "93004",
    },
    Column {
        header: &["93005"],
        times: ["07:00", "", "07:18", "07:20", "", "", "", "", "07:50", "", "08:05"],
        reversal: "08:15",
        onward: "93006",
    },
    Column {
        header: &["93008"],
        times: ["09:00", "", "", "", "", "", "", "", "", "", "10:05"],
        reversal: "",
        onward: "",
    },
    Column {
        header: &["93011", "AC", "Air Conditioned", "15 CAR"],
        times: ["08:30", "", "08:45", "08:46", "", "09:00", "", "", "09:10", "", "09:25"],
        reversal: "09:35",
        onward: "93012",
    },
    Column {
        header: &["12345"],
        times: ["05:30", "", "", "", "", "", "", "", "06:20", "", ""],
        reversal: "",
        onward: "",
    },
];

#[rustfmt::skip]
const DOWN_COLUMNS: [Column; 3] = [
    Column {
        header: &["93002"],
        times: ["06:20", "", "06:35", "06:36", "", "06:45", "06:55", "", "07:10", "", "07:30"],
        reversal: "",
        onward: "",
    },
    Column {
        header: &["93004"],
        times: ["07:00", "", "07:14", "07:15", "", "", "07:30", "", "07:45", "", "ARR BVI"],
        reversal: "",
        onward: "93099",
    },
    Column {
        header: &["93012", "AC", "Air Conditioned"],
        times: ["09:40", "", "09:55", "09:56", "", "", "10:05", "", "10:20", "", "10:40"],
        reversal: "",
        onward: "",
    },
];

/// The sample WTT: UP sheet then DOWN sheet.
pub fn wtt_workbook() -> Workbook {
    Workbook::new(vec![
        wtt_sheet("UP", &UP_ROWS, &UP_COLUMNS, true),
        wtt_sheet("DOWN", &DOWN_ROWS, &DOWN_COLUMNS, false),
    ])
}

/// The sample link summary.
pub fn summary_workbook() -> Workbook {
    let rows: Vec<Vec<&str>> = vec![
        vec!["WESTERN RAILWAY SUBURBAN LINKS"],
        vec![],
        vec!["", "LINK", "SERVICES"],
        vec!["", "A\u{2020}", "93001", "93002", "ETY 3"],
        vec!["", "", "05:00", "06:20", ""],
        vec!["", "", "SLOW", "SLOW", ""],
        vec![],
        vec!["", "B", "93003", "93004", "93008"],
        vec!["", "", "06:00", "07:00", "09:00"],
        vec!["", "", "FAST", "FAST", "SLOW"],
        vec![],
        vec!["", "C", "93005", "93006"],
        vec!["", "", "07:00", ""],
        vec!["", "", "SLOW", "SLOW"],
        vec![],
        vec!["", "D", "93011", "93012"],
        vec!["", "", "08:30", "09:40"],
        vec!["", "", "FAST", "FAST"],
    ];
    Workbook::new(vec![Sheet::new("LINKS", Grid::from_rows(rows))])
}

fn wtt_sheet(name: &str, stations: &[(&str, &str)], columns: &[Column], up: bool) -> Sheet {
    let mut rows: Vec<Vec<&str>> = vec![
        vec!["WESTERN RAILWAY"],
        vec!["SUBURBAN WORKING TIME TABLE"],
        vec![],
        vec![],
        vec!["", "", "TRAIN NO."],
    ];
    debug_assert_eq!(rows.len(), TITLE_ROWS);

    for i in 0..HEADER_CELLS {
        let mut row = vec![if i == 0 { "STATIONS" } else { "" }, ""];
        row.extend(columns.iter().map(|c| c.header.get(i).copied().unwrap_or("")));
        rows.push(row);
    }

    for (i, (station, flag)) in stations.iter().enumerate() {
        let mut row = vec![*station, *flag];
        row.extend(columns.iter().map(|c| c.times[i]));
        rows.push(row);
    }

    let mut reversed = vec!["Reversed as", ""];
    if up {
        reversed.extend(columns.iter().map(|c| c.reversal));
        rows.push(reversed);
        let mut onward = vec!["", ""];
        onward.extend(columns.iter().map(|c| c.onward));
        rows.push(onward);
    } else {
        reversed.extend(columns.iter().map(|c| c.onward));
        rows.push(reversed);
    }
    while rows.len() < TITLE_ROWS + HEADER_CELLS + stations.len() + TRAILING_ROWS {
        rows.push(vec![]);
    }

    Sheet::new(name, Grid::from_rows(rows))
}
