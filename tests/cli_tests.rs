use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use tempfile::tempdir;

mod common;
use common::{add_block, daybook, data_file};

#[test]
fn note_markers_and_color_show_on_day() {
    let dir = tempdir().unwrap();
    daybook(dir.path())
        .args(["note", "2024-03-09", "dentist", "at", "noon"])
        .assert()
        .success()
        .stdout(contains("Updated note for 2024-03-09"));
    daybook(dir.path())
        .args(["dot", "2024-03-09", "health"])
        .assert()
        .success()
        .stdout(contains("Marker health on"));
    daybook(dir.path())
        .args(["color", "2024-03-09", "rest"])
        .assert()
        .success();

    daybook(dir.path())
        .args(["day", "2024-03-09"])
        .assert()
        .success()
        .stdout(contains("2024-03-09 (Saturday)"))
        .stdout(contains("note: dentist at noon"))
        .stdout(contains("markers: health"))
        .stdout(contains("color: rest"))
        .stdout(contains("(no blocks)"));

    let stored = fs::read_to_string(data_file(dir.path())).unwrap();
    assert!(stored.contains("2024-2"), "month key is zero-based: {stored}");
}

#[test]
fn toggling_a_marker_twice_removes_it() {
    let dir = tempdir().unwrap();
    daybook(dir.path()).args(["dot", "2024-01-01", "joy"]).assert().success();
    daybook(dir.path())
        .args(["dot", "2024-01-01", "joy"])
        .assert()
        .success()
        .stdout(contains("Marker joy off"));
    daybook(dir.path())
        .args(["day", "2024-01-01"])
        .assert()
        .success()
        .stdout(contains("markers").not());
}

#[test]
fn weekly_block_occurs_on_selected_days() {
    let dir = tempdir().unwrap();
    add_block(
        dir.path(),
        &[
            "2024-01-01", "08:00", "09:00", "--title", "Gym", "--category", "health",
            "--repeat", "weekly", "--on", "1,3,5",
        ],
    );

    daybook(dir.path())
        .args(["day", "2024-01-10"])
        .assert()
        .success()
        .stdout(contains("08:00-09:00  Gym [Health]"))
        .stdout(contains("repeats every week from 2024-01-01 on Mon,Wed,Fri"));
    daybook(dir.path())
        .args(["day", "2024-01-09"])
        .assert()
        .success()
        .stdout(contains("Gym").not());
}

#[test]
fn agenda_lists_each_day_in_start_order() {
    let dir = tempdir().unwrap();
    add_block(
        dir.path(),
        &["2024-01-01", "10:00", "11:00", "--title", "Review", "--repeat", "daily", "--every", "2"],
    );
    add_block(dir.path(), &["2024-01-03", "07:30", "08:00", "--title", "Run"]);

    let output = daybook(dir.path())
        .args(["agenda", "2024-01-01", "--days", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "2024-01-01 (Mon)");
    assert!(lines[1].contains("Review"));
    assert!(stdout.contains("2024-01-02 (Tue)\n  (no blocks)"));
    let run = stdout.find("Run").unwrap();
    let third = stdout.find("2024-01-03").unwrap();
    let review_on_third = stdout[third..].find("Review").unwrap() + third;
    assert!(run < review_on_third);
}

#[test]
fn until_bounds_the_series() {
    let dir = tempdir().unwrap();
    add_block(
        dir.path(),
        &["2024-01-01", "06:00", "06:30", "--title", "Stretch", "--repeat", "daily", "--until", "2024-01-04"],
    );
    daybook(dir.path())
        .args(["day", "2024-01-04"])
        .assert()
        .success()
        .stdout(contains("Stretch"));
    daybook(dir.path())
        .args(["day", "2024-01-05"])
        .assert()
        .success()
        .stdout(contains("Stretch").not());
}

#[test]
fn removing_a_block_removes_its_series() {
    let dir = tempdir().unwrap();
    let id = add_block(
        dir.path(),
        &["2024-01-31", "12:00", "13:00", "--title", "Rent", "--repeat", "monthly"],
    );
    daybook(dir.path())
        .args(["day", "2024-03-31"])
        .assert()
        .success()
        .stdout(contains("Rent"));
    daybook(dir.path())
        .args(["block", "rm", &id])
        .assert()
        .success()
        .stdout(contains(format!("Removed block {}", id)));
    daybook(dir.path())
        .args(["day", "2024-03-31"])
        .assert()
        .success()
        .stdout(contains("Rent").not());
}

#[test]
fn editing_a_block_changes_its_title() {
    let dir = tempdir().unwrap();
    let id = add_block(dir.path(), &["2024-05-01", "09:00", "10:00", "--title", "Draft"]);
    daybook(dir.path())
        .args(["block", "edit", &id, "--title", "Final", "--end", "11:00"])
        .assert()
        .success();
    daybook(dir.path())
        .args(["day", "2024-05-01"])
        .assert()
        .success()
        .stdout(contains("09:00-11:00  Final"));
}

#[test]
fn block_ending_before_it_starts_is_rejected() {
    let dir = tempdir().unwrap();
    daybook(dir.path())
        .args(["block", "add", "2024-01-01", "10:00", "09:00"])
        .assert()
        .failure()
        .stderr(contains("block must end after it starts"));
    assert!(!data_file(dir.path()).exists());
}

#[test]
fn unknown_category_is_rejected() {
    let dir = tempdir().unwrap();
    daybook(dir.path())
        .args(["dot", "2024-01-01", "purple"])
        .assert()
        .failure()
        .stderr(contains("unknown category: purple"));
}

#[test]
fn corrupt_calendar_file_starts_empty() {
    let dir = tempdir().unwrap();
    fs::write(data_file(dir.path()), "{{ definitely: [not yaml").unwrap();
    daybook(dir.path())
        .args(["day", "2024-01-01"])
        .assert()
        .success()
        .stdout(contains("(no blocks)"));
}

#[test]
fn one_shot_undo_has_nothing_to_undo() {
    let dir = tempdir().unwrap();
    daybook(dir.path()).args(["note", "2024-01-01", "kept"]).assert().success();
    daybook(dir.path())
        .arg("undo")
        .assert()
        .success()
        .stdout(contains("Nothing to undo"));
    daybook(dir.path())
        .args(["day", "2024-01-01"])
        .assert()
        .success()
        .stdout(contains("note: kept"));
}

#[test]
fn shell_keeps_history_between_commands() {
    let dir = tempdir().unwrap();
    let script = "\
note 2024-01-01 \"first draft\"
note 2024-01-01 second
undo
day 2024-01-01
redo
undo
undo
undo
quit
day 2024-01-01
";
    let output = daybook(dir.path())
        .arg("shell")
        .write_stdin(script)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("note: first draft"));
    assert!(stdout.contains("Redid last change"));
    assert!(stdout.contains("Nothing to undo"));
    // the line after quit never runs
    assert_eq!(stdout.matches("2024-01-01 (Monday)").count(), 1);

    // the last undo emptied the calendar and was persisted
    daybook(dir.path())
        .args(["day", "2024-01-01"])
        .assert()
        .success()
        .stdout(contains("note").not());
}

#[test]
fn shell_reports_errors_and_continues() {
    let dir = tempdir().unwrap();
    daybook(dir.path())
        .arg("shell")
        .write_stdin("dot 2024-01-01 purple\nnote 2024-01-01 \"open\nblock add 2024-01-01 nine ten\nnote 2024-01-01 still here\nday 2024-01-01\n")
        .assert()
        .success()
        .stdout(contains("error: unknown category: purple"))
        .stdout(contains("error: unterminated quote"))
        .stdout(contains("error: invalid time (use HH:MM): nine"))
        .stdout(contains("note: still here"));
}

#[test]
fn unreadable_block_keeps_rest_of_calendar() {
    let dir = tempdir().unwrap();
    fs::write(
        data_file(dir.path()),
        "\"2024-0\":\n  \"1\":\n    note: keep me\n    timeBlocks:\n      - {id: bad, startTime: \"09:00\", endTime: \"10:00\", startDate: \"2024-01-01\", recurrence: {frequency: hourly}}\n",
    )
    .unwrap();
    daybook(dir.path())
        .args(["note", "2024-01-02", "next"])
        .assert()
        .success();
    daybook(dir.path())
        .args(["day", "2024-01-01"])
        .assert()
        .success()
        .stdout(contains("note: keep me"))
        .stdout(contains("(no blocks)"));
    let saved = fs::read_to_string(data_file(dir.path())).unwrap();
    assert!(saved.contains("hourly"), "{saved}");
}
