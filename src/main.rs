use clap::{Parser, Subcommand, ValueEnum};
use hanmeter::analyze::Analyzer;
use hanmeter::config::{ConfigStore, FileConfigStore};
use hanmeter::db::{parse_book_info, BookDb, BookRecord, RankMetric};
use hanmeter::freq::FreqTable;
use hanmeter::input::{find_book_files, read_book};
use hanmeter::reference::{head_list_from_text, rank_map_from_text, RankMap};
use hanmeter::report;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Chinese reading difficulty analyzer: character frequency, coverage
/// against reference lists, and a weighted 0-100 difficulty score.
#[derive(Parser, Debug)]
#[clap(name = "hanmeter", version, about)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze book files and write per-book and summary reports
    Analyze {
        /// specific book files to analyze (defaults to all .txt under --books-dir)
        paths: Vec<PathBuf>,

        /// directory scanned for book files when no paths are given
        #[clap(long, default_value = "books")]
        books_dir: PathBuf,

        /// high-frequency head list, one entry per line
        #[clap(long, default_value = "前1500.txt")]
        head_list: PathBuf,

        /// rank dictionary, characters in frequency order
        #[clap(long, default_value = "dict_simple.txt")]
        rank_dict: PathBuf,

        /// where report files are written
        #[clap(short, long, default_value = "reports")]
        output_dir: PathBuf,

        /// also write a CSV summary to this path
        #[clap(long)]
        csv: Option<PathBuf>,

        /// store results in the database
        #[clap(short, long)]
        upload: bool,

        /// re-analyze books that are already stored
        #[clap(short, long)]
        force: bool,

        /// database file (defaults to the per-user data directory)
        #[clap(long)]
        db: Option<PathBuf>,
    },

    /// List stored books ordered by a metric
    Rank {
        #[clap(long, value_enum, default_value_t = Metric::Score)]
        by: Metric,

        /// hardest first instead of easiest first
        #[clap(long)]
        desc: bool,

        #[clap(short, long, default_value_t = 20)]
        limit: usize,

        #[clap(long, default_value_t = 0)]
        offset: usize,

        #[clap(long)]
        db: Option<PathBuf>,
    },

    /// List stored books with difficulty score in a range
    Filter {
        #[clap(long, default_value_t = 0.0)]
        min: f64,

        #[clap(long, default_value_t = 100.0)]
        max: f64,

        #[clap(long)]
        db: Option<PathBuf>,
    },

    /// Search stored books by title
    Search {
        keyword: String,

        #[clap(long)]
        db: Option<PathBuf>,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Metric {
    Score,
    Chars95,
    Chars99,
    Order95,
    Order99,
    CharTypes,
}

impl Metric {
    fn as_rank_metric(self) -> RankMetric {
        match self {
            Metric::Score => RankMetric::Difficulty,
            Metric::Chars95 => RankMetric::Chars95,
            Metric::Chars99 => RankMetric::Chars99,
            Metric::Order95 => RankMetric::AvgOrder95,
            Metric::Order99 => RankMetric::AvgOrder99,
            Metric::CharTypes => RankMetric::CharTypes,
        }
    }
}

fn open_db(path: Option<&Path>) -> Result<BookDb, Box<dyn Error>> {
    Ok(match path {
        Some(p) => BookDb::open(p)?,
        None => BookDb::open_default()?,
    })
}

// Reference lists go through the same encoding detection as books; curated
// head lists in the wild are frequently GBK.
fn load_reference(head_list: &Path, rank_dict: &Path) -> (Vec<char>, RankMap) {
    let head = match read_book(head_list) {
        Ok((text, _)) => head_list_from_text(&text),
        Err(e) => {
            eprintln!(
                "警告: 无法读取高频字表 {}: {e}，覆盖率分析将退化为字序区间",
                head_list.display()
            );
            Vec::new()
        }
    };
    let rank = match read_book(rank_dict) {
        Ok((text, _)) => rank_map_from_text(&text),
        Err(e) => {
            eprintln!(
                "警告: 无法读取字序词典 {}: {e}，字序相关维度将按中性分处理",
                rank_dict.display()
            );
            RankMap::new()
        }
    };
    (head, rank)
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    paths: Vec<PathBuf>,
    books_dir: &Path,
    head_list: &Path,
    rank_dict: &Path,
    output_dir: &Path,
    csv: Option<&Path>,
    upload: bool,
    force: bool,
    db_path: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let files = if paths.is_empty() {
        find_book_files(books_dir)?
    } else {
        paths
    };
    if files.is_empty() {
        eprintln!("没有找到可分析的 .txt 文件（目录: {}）", books_dir.display());
        return Ok(());
    }

    let (head, rank) = load_reference(head_list, rank_dict);
    let config = FileConfigStore::new().load();
    let analyzer = Analyzer::new(head, rank.clone(), config);
    let mut db = if upload { Some(open_db(db_path)?) } else { None };

    fs::create_dir_all(output_dir)?;
    let mut records = Vec::with_capacity(files.len());

    for path in &files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let (book_name, author) = parse_book_info(&file_name);

        if !force {
            if let Some(db) = &db {
                if db.find_id(&book_name, author.as_deref())?.is_some() {
                    println!("已存在，跳过 {book_name}（--force 可重新分析）");
                    continue;
                }
            }
        }

        let (text, encoding) = match read_book(path) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("跳过 {}: {e}", path.display());
                continue;
            }
        };
        let freq = FreqTable::from_text(&text);
        let analysis = analyzer.analyze(&freq);

        let report_text = report::book_report(&file_name, encoding.name(), &freq, &rank, &analysis);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());
        fs::write(output_dir.join(format!("{stem}_分析报告.txt")), &report_text)?;

        let record = BookRecord::from_analysis(book_name, author, file_name, &analysis);
        println!(
            "{}  {}  {:.1}分  字种{}  总字数{}",
            record.book_name,
            record.star_level,
            record.difficulty_score,
            record.char_types,
            record.total_chars
        );
        records.push(record);
    }

    if records.is_empty() {
        eprintln!("没有新的分析结果");
        return Ok(());
    }

    let summary = report::summary_report(&records);
    fs::write(output_dir.join("汇总报告.txt"), &summary)?;
    println!("\n报告已写入 {}（{} 本）", output_dir.display(), records.len());

    if let Some(csv_path) = csv {
        report::write_summary_csv(csv_path, &records)?;
        println!("CSV 已写入 {}", csv_path.display());
    }

    if let Some(db) = &mut db {
        let stored = db.upsert_batch(&records)?;
        println!("已写入数据库 {stored} 条记录");
    }

    Ok(())
}

fn print_records(records: &[BookRecord]) {
    if records.is_empty() {
        println!("没有匹配的记录");
        return;
    }
    let mut table = report::Table::new(
        &["排名", "书名", "难度", "分数", "95%字数", "字种数"],
        &[6, 30, 22, 8, 10, 8],
    );
    for (idx, r) in records.iter().enumerate() {
        table.add_row([
            (idx + 1).to_string(),
            r.book_name.clone(),
            r.star_level.clone(),
            format!("{:.1}", r.difficulty_score),
            r.chars_95.to_string(),
            r.char_types.to_string(),
        ]);
    }
    println!("{}", table.render());
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            paths,
            books_dir,
            head_list,
            rank_dict,
            output_dir,
            csv,
            upload,
            force,
            db,
        } => run_analyze(
            paths,
            &books_dir,
            &head_list,
            &rank_dict,
            &output_dir,
            csv.as_deref(),
            upload,
            force,
            db.as_deref(),
        )?,
        Command::Rank {
            by,
            desc,
            limit,
            offset,
            db,
        } => {
            let db = open_db(db.as_deref())?;
            let rows = db.rank_by(by.as_rank_metric(), desc, limit, offset)?;
            print_records(&rows);
        }
        Command::Filter { min, max, db } => {
            let db = open_db(db.as_deref())?;
            let rows = db.filter_by_score(min, max)?;
            print_records(&rows);
        }
        Command::Search { keyword, db } => {
            let db = open_db(db.as_deref())?;
            let rows = db.search(&keyword)?;
            print_records(&rows);
        }
    }

    Ok(())
}
