use assert_cmd::Command;
use std::fs;
use tempfile::tempdir;

fn write_reference(dir: &std::path::Path) {
    fs::write(dir.join("前1500.txt"), "的 一 是 了 人").unwrap();
    fs::write(dir.join("dict_simple.txt"), "的\n一\n是\n了\n人\n你\n好\n").unwrap();
}

#[test]
fn help_lists_subcommands() {
    let output = Command::cargo_bin("hanmeter")
        .unwrap()
        .arg("--help")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    for sub in ["analyze", "rank", "filter", "search"] {
        assert!(stdout.contains(sub), "missing subcommand: {sub}");
    }
}

#[test]
fn analyze_writes_reports_and_uploads() {
    let dir = tempdir().unwrap();
    write_reference(dir.path());
    let books = dir.path().join("books");
    fs::create_dir(&books).unwrap();
    fs::write(
        books.join("01_小书.txt"),
        format!("{}你好。", "的一是了人".repeat(40)),
    )
    .unwrap();

    let reports = dir.path().join("reports");
    let db = dir.path().join("books.db");
    let csv = dir.path().join("summary.csv");

    let output = Command::cargo_bin("hanmeter")
        .unwrap()
        .current_dir(dir.path())
        .args(["analyze", "--upload"])
        .arg("--db")
        .arg(&db)
        .arg("--csv")
        .arg(&csv)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(stdout.contains("小书"));

    assert!(reports.join("01_小书_分析报告.txt").exists());
    assert!(reports.join("汇总报告.txt").exists());
    assert!(csv.exists());

    let report = fs::read_to_string(reports.join("01_小书_分析报告.txt")).unwrap();
    assert!(report.contains("书籍难度分析报告"));
    assert!(report.contains("总字符数: 202"));

    // The uploaded row is visible through the query subcommands.
    let output = Command::cargo_bin("hanmeter")
        .unwrap()
        .args(["rank", "--limit", "5"])
        .arg("--db")
        .arg(&db)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(stdout.contains("小书"));

    let output = Command::cargo_bin("hanmeter")
        .unwrap()
        .args(["search", "小书"])
        .arg("--db")
        .arg(&db)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(stdout.contains("小书"));
}

#[test]
fn analyze_skips_stored_books_unless_forced() {
    let dir = tempdir().unwrap();
    write_reference(dir.path());
    let books = dir.path().join("books");
    fs::create_dir(&books).unwrap();
    fs::write(books.join("重复.txt"), "的一是了人你好").unwrap();
    let db = dir.path().join("books.db");

    let run = |extra: &[&str]| {
        let mut cmd = Command::cargo_bin("hanmeter").unwrap();
        cmd.current_dir(dir.path()).args(["analyze", "--upload"]);
        cmd.arg("--db").arg(&db).args(extra);
        let output = cmd.assert().success();
        String::from_utf8_lossy(&output.get_output().stdout).into_owned()
    };

    run(&[]);
    let second = run(&[]);
    assert!(second.contains("已存在，跳过"));
    let forced = run(&["--force"]);
    assert!(!forced.contains("已存在，跳过"));
    assert!(forced.contains("重复"));
}

#[test]
fn analyze_missing_reference_still_succeeds() {
    let dir = tempdir().unwrap();
    let books = dir.path().join("books");
    fs::create_dir(&books).unwrap();
    fs::write(books.join("孤本.txt"), "天地玄黄宇宙洪荒").unwrap();

    let output = Command::cargo_bin("hanmeter")
        .unwrap()
        .current_dir(dir.path())
        .arg("analyze")
        .assert()
        .success();

    let stderr = String::from_utf8_lossy(&output.get_output().stderr).into_owned();
    assert!(stderr.contains("警告"));
    assert!(dir.path().join("reports").join("孤本_分析报告.txt").exists());
}

#[test]
fn filter_on_empty_db_reports_no_matches() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("empty.db");
    let output = Command::cargo_bin("hanmeter")
        .unwrap()
        .args(["filter", "--min", "10", "--max", "20"])
        .arg("--db")
        .arg(&db)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(stdout.contains("没有匹配的记录"));
}
