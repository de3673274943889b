use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

const INCOMING: &str = "Dear Customer your Account 1*****6789 has been Credited with \
    ETB 1,500.00 from Almaz Tadesse, on 01/11/2024 at 10:20:11. Your Current Balance is \
    ETB 10,000.00. Thank you for Banking with CBE!";

const OUTGOING: &str = "Dear Customer your Account 1*****6789 has been debited with \
    ETB250.00 .Service charge of ETB0.50 and VAT(15%) of ETB0.08 with a total of ETB5000 . \
    Your Current Balance is ETB 3,000.00. Thank you for Banking with CBE! \
    https://127.0.0.1:1/receipt";

// 2024-11-01, well after the default cutoff in any time zone.
const NOV_2024: i64 = 1_730_456_411_000;
// 2024-06-01
const JUN_2024: i64 = 1_717_243_200_000;

fn birr(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("birr").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn initialized() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    let data = home.path().join("data");
    birr(home.path())
        .args(["init", "--data-dir", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized birr"));
    home
}

fn write_export(dir: &Path, messages: serde_json::Value) -> String {
    let path = dir.join("sms-file.json");
    std::fs::write(&path, serde_json::to_string(&messages).unwrap()).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn init_creates_database_and_category_table() {
    let home = initialized();
    let data = home.path().join("data");
    assert!(data.join("transactions.db").exists());
    assert_eq!(std::fs::read_to_string(data.join("category.json")).unwrap().trim(), "{}");
    assert!(home.path().join(".config/birr/settings.json").exists());
}

#[test]
fn ingest_reports_each_transaction() {
    let home = initialized();
    let file = write_export(
        home.path(),
        json!([
            {"date": NOV_2024, "text": INCOMING},
            {"date": NOV_2024 + 1000, "text": "Your OTP is 1234"},
            {"date": NOV_2024 + 2000, "text": OUTGOING},
            {"date": JUN_2024, "text": INCOMING},
        ]),
    );

    birr(home.path())
        .args(["ingest", &file, "--timeout", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Incoming transaction of ETB 1,500.00 received from Unknown",
        ))
        .stdout(predicate::str::contains("Outgoing transaction of ETB 250.00 to Unknown"))
        .stdout(predicate::str::contains("2 stored, 1 before 2024-10-01, 1 not transactions, 0 rejected"));

    birr(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions:  2"))
        .stdout(predicate::str::contains("Last ingest:   sms-file.json"));
}

#[test]
fn ingest_twice_warns_about_repeat() {
    let home = initialized();
    let file = write_export(home.path(), json!([{"date": NOV_2024, "text": INCOMING}]));

    birr(home.path()).args(["ingest", &file]).assert().success();
    birr(home.path())
        .args(["ingest", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("ingested before"));
}

#[test]
fn unreadable_entry_does_not_stop_the_batch() {
    let home = initialized();
    let file = write_export(
        home.path(),
        json!([
            {"date": NOV_2024, "text": INCOMING},
            {"date": NOV_2024 + 1000},
        ]),
    );

    birr(home.path())
        .args(["ingest", &file, "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Incoming transaction of ETB 1,500.00"))
        .stdout(predicate::str::contains("1 stored, 0 before 2024-10-01, 0 not transactions, 1 rejected"));

    birr(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions:  1"));
}

#[test]
fn dry_run_stores_nothing() {
    let home = initialized();
    let file = write_export(home.path(), json!([{"date": NOV_2024, "text": INCOMING}]));

    birr(home.path())
        .args(["ingest", &file, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 would be stored"));

    birr(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions:  0"));
}

#[test]
fn ingest_fails_without_category_table() {
    let home = initialized();
    std::fs::remove_file(home.path().join("data/category.json")).unwrap();
    let file = write_export(home.path(), json!([{"date": NOV_2024, "text": INCOMING}]));

    birr(home.path())
        .args(["ingest", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("category table"));
}

#[test]
fn categories_report_uses_category_table() {
    let home = initialized();
    std::fs::write(home.path().join("data/category.json"), r#"{"Rent": "Housing"}"#).unwrap();
    let file = write_export(home.path(), json!([{"date": NOV_2024, "text": INCOMING}]));
    birr(home.path()).args(["ingest", &file, "--offline"]).assert().success();

    birr(home.path())
        .args(["report", "monthly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ETB 1,500.00"));
    birr(home.path())
        .args(["report", "categories"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(uncategorized)"));
}

#[test]
fn extract_shows_fields() {
    let home = tempfile::tempdir().unwrap();
    birr(home.path())
        .args(["extract", INCOMING, "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("incoming"))
        .stdout(predicate::str::contains("10,000.00"));

    birr(home.path())
        .args(["extract", "Your OTP is 1234"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not a transaction"));
}

#[test]
fn report_without_database_fails() {
    let home = tempfile::tempdir().unwrap();
    birr(home.path())
        .args(["report", "receivers"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("birr init"));
}
