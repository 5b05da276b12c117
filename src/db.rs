use crate::analyze::BookAnalysis;
use chrono::Local;
use directories::ProjectDirs;
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

/// One persisted analysis row, keyed on (book_name, author).
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub book_name: String,
    pub author: Option<String>,
    pub file_name: String,
    pub total_chars: u64,
    pub char_types: usize,
    pub char_types_in_head: usize,
    pub char_types_out_head: usize,
    pub coverage_500: f64,
    pub coverage_1000: f64,
    pub coverage_1500: f64,
    pub chars_95: usize,
    pub chars_99: usize,
    pub chars_95_in_head: usize,
    pub chars_95_out_head: usize,
    pub chars_99_in_head: usize,
    pub chars_99_out_head: usize,
    pub avg_order_95: Option<f64>,
    pub avg_order_99: Option<f64>,
    pub rare_char_types: usize,
    pub rare_char_ratio: f64,
    pub difficulty_score: f64,
    pub star_level: String,
    pub tool_version: String,
}

impl BookRecord {
    pub fn from_analysis(book_name: String, author: Option<String>, file_name: String, analysis: &BookAnalysis) -> Self {
        let coverage = |n| {
            analysis
                .coverage_at(n)
                .map(|stat| stat.coverage)
                .unwrap_or(0.0)
        };
        BookRecord {
            book_name,
            author,
            file_name,
            total_chars: analysis.total_chars,
            char_types: analysis.distinct_chars,
            char_types_in_head: analysis.distinct_chars - analysis.extra_char_types,
            char_types_out_head: analysis.extra_char_types,
            coverage_500: coverage(500),
            coverage_1000: coverage(1000),
            coverage_1500: coverage(1500),
            chars_95: analysis.chars_95,
            chars_99: analysis.chars_99,
            chars_95_in_head: analysis.chars_95_in_head,
            chars_95_out_head: analysis.chars_95_out_head,
            chars_99_in_head: analysis.chars_99_in_head,
            chars_99_out_head: analysis.chars_99_out_head,
            avg_order_95: analysis.avg_order_95,
            avg_order_99: analysis.avg_order_99,
            rare_char_types: analysis.rarity.rare_type_count,
            rare_char_ratio: analysis.rarity.rare_char_ratio,
            difficulty_score: analysis.difficulty.score,
            star_level: analysis.difficulty.stars.clone(),
            tool_version: crate::TOOL_VERSION.to_string(),
        }
    }
}

/// Metrics a ranking can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMetric {
    Difficulty,
    Chars95,
    Chars99,
    AvgOrder95,
    AvgOrder99,
    CharTypes,
}

impl RankMetric {
    fn column(self) -> &'static str {
        match self {
            RankMetric::Difficulty => "difficulty_score",
            RankMetric::Chars95 => "chars_95",
            RankMetric::Chars99 => "chars_99",
            RankMetric::AvgOrder95 => "avg_order_95",
            RankMetric::AvgOrder99 => "avg_order_99",
            RankMetric::CharTypes => "char_types",
        }
    }
}

/// Database manager for book difficulty results.
#[derive(Debug)]
pub struct BookDb {
    conn: Connection,
}

const SELECT_COLUMNS: &str = "book_name, author, file_name, total_chars, char_types, \
     char_types_in_head, char_types_out_head, coverage_500, coverage_1000, coverage_1500, \
     chars_95, chars_99, chars_95_in_head, chars_95_out_head, chars_99_in_head, chars_99_out_head, \
     avg_order_95, avg_order_99, rare_char_types, rare_char_ratio, difficulty_score, star_level, tool_version";

impl BookDb {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(BookDb { conn })
    }

    /// Opens the default per-user database.
    pub fn open_default() -> Result<Self> {
        let path = Self::default_path().unwrap_or_else(|| PathBuf::from("hanmeter.db"));
        Self::open(&path)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(BookDb { conn })
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "hanmeter").map(|pd| pd.data_local_dir().join("books.db"))
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS book_difficulty (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                book_name TEXT NOT NULL,
                author TEXT,
                file_name TEXT NOT NULL,
                total_chars INTEGER NOT NULL,
                char_types INTEGER NOT NULL,
                char_types_in_head INTEGER NOT NULL,
                char_types_out_head INTEGER NOT NULL,
                coverage_500 REAL NOT NULL,
                coverage_1000 REAL NOT NULL,
                coverage_1500 REAL NOT NULL,
                chars_95 INTEGER NOT NULL,
                chars_99 INTEGER NOT NULL,
                chars_95_in_head INTEGER NOT NULL,
                chars_95_out_head INTEGER NOT NULL,
                chars_99_in_head INTEGER NOT NULL,
                chars_99_out_head INTEGER NOT NULL,
                avg_order_95 REAL,
                avg_order_99 REAL,
                rare_char_types INTEGER NOT NULL,
                rare_char_ratio REAL NOT NULL,
                difficulty_score REAL NOT NULL,
                star_level TEXT NOT NULL,
                tool_version TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_book_identity ON book_difficulty(book_name, IFNULL(author, ''))",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_book_difficulty_score ON book_difficulty(difficulty_score)",
            [],
        )?;
        Ok(())
    }

    /// The row id for a (book_name, author) pair, if stored.
    pub fn find_id(&self, book_name: &str, author: Option<&str>) -> Result<Option<i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM book_difficulty WHERE book_name = ?1 AND IFNULL(author, '') = IFNULL(?2, '')",
        )?;
        let mut rows = stmt.query_map(params![book_name, author], |row| row.get(0))?;
        rows.next().transpose()
    }

    /// Inserts the record or replaces the stored row for the same book.
    pub fn upsert(&self, record: &BookRecord) -> Result<()> {
        Self::upsert_on(&self.conn, record)
    }

    /// Upserts a whole batch inside one transaction.
    pub fn upsert_batch(&mut self, records: &[BookRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for record in records {
            Self::upsert_on(&tx, record)?;
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn upsert_on(conn: &Connection, record: &BookRecord) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO book_difficulty (
                book_name, author, file_name, total_chars, char_types,
                char_types_in_head, char_types_out_head,
                coverage_500, coverage_1000, coverage_1500,
                chars_95, chars_99, chars_95_in_head, chars_95_out_head,
                chars_99_in_head, chars_99_out_head,
                avg_order_95, avg_order_99, rare_char_types, rare_char_ratio,
                difficulty_score, star_level, tool_version, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                    ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)
            ON CONFLICT(book_name, IFNULL(author, '')) DO UPDATE SET
                file_name = excluded.file_name,
                total_chars = excluded.total_chars,
                char_types = excluded.char_types,
                char_types_in_head = excluded.char_types_in_head,
                char_types_out_head = excluded.char_types_out_head,
                coverage_500 = excluded.coverage_500,
                coverage_1000 = excluded.coverage_1000,
                coverage_1500 = excluded.coverage_1500,
                chars_95 = excluded.chars_95,
                chars_99 = excluded.chars_99,
                chars_95_in_head = excluded.chars_95_in_head,
                chars_95_out_head = excluded.chars_95_out_head,
                chars_99_in_head = excluded.chars_99_in_head,
                chars_99_out_head = excluded.chars_99_out_head,
                avg_order_95 = excluded.avg_order_95,
                avg_order_99 = excluded.avg_order_99,
                rare_char_types = excluded.rare_char_types,
                rare_char_ratio = excluded.rare_char_ratio,
                difficulty_score = excluded.difficulty_score,
                star_level = excluded.star_level,
                tool_version = excluded.tool_version,
                updated_at = excluded.updated_at
            "#,
            params![
                record.book_name,
                record.author,
                record.file_name,
                record.total_chars as i64,
                record.char_types as i64,
                record.char_types_in_head as i64,
                record.char_types_out_head as i64,
                record.coverage_500,
                record.coverage_1000,
                record.coverage_1500,
                record.chars_95 as i64,
                record.chars_99 as i64,
                record.chars_95_in_head as i64,
                record.chars_95_out_head as i64,
                record.chars_99_in_head as i64,
                record.chars_99_out_head as i64,
                record.avg_order_95,
                record.avg_order_99,
                record.rare_char_types as i64,
                record.rare_char_ratio,
                record.difficulty_score,
                record.star_level,
                record.tool_version,
                Local::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> Result<BookRecord> {
        Ok(BookRecord {
            book_name: row.get(0)?,
            author: row.get(1)?,
            file_name: row.get(2)?,
            total_chars: row.get::<_, i64>(3)? as u64,
            char_types: row.get::<_, i64>(4)? as usize,
            char_types_in_head: row.get::<_, i64>(5)? as usize,
            char_types_out_head: row.get::<_, i64>(6)? as usize,
            coverage_500: row.get(7)?,
            coverage_1000: row.get(8)?,
            coverage_1500: row.get(9)?,
            chars_95: row.get::<_, i64>(10)? as usize,
            chars_99: row.get::<_, i64>(11)? as usize,
            chars_95_in_head: row.get::<_, i64>(12)? as usize,
            chars_95_out_head: row.get::<_, i64>(13)? as usize,
            chars_99_in_head: row.get::<_, i64>(14)? as usize,
            chars_99_out_head: row.get::<_, i64>(15)? as usize,
            avg_order_95: row.get(16)?,
            avg_order_99: row.get(17)?,
            rare_char_types: row.get::<_, i64>(18)? as usize,
            rare_char_ratio: row.get(19)?,
            difficulty_score: row.get(20)?,
            star_level: row.get(21)?,
            tool_version: row.get(22)?,
        })
    }

    fn collect_records(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<BookRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_record)?;
        rows.collect()
    }

    /// Stored rows ordered by `metric`. NULL metric values (missing rank
    /// averages) sort last either way.
    pub fn rank_by(
        &self,
        metric: RankMetric,
        descending: bool,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<BookRecord>> {
        let direction = if descending { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM book_difficulty \
             ORDER BY {col} IS NULL, {col} {dir}, id {dir} LIMIT ?1 OFFSET ?2",
            col = metric.column(),
            dir = direction,
        );
        self.collect_records(&sql, &[&(limit as i64), &(offset as i64)])
    }

    /// Rows with difficulty_score in [min, max], easiest first.
    pub fn filter_by_score(&self, min: f64, max: f64) -> Result<Vec<BookRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM book_difficulty \
             WHERE difficulty_score >= ?1 AND difficulty_score <= ?2 \
             ORDER BY difficulty_score ASC, id ASC"
        );
        self.collect_records(&sql, &[&min, &max])
    }

    /// Fuzzy title search, easiest first.
    pub fn search(&self, keyword: &str) -> Result<Vec<BookRecord>> {
        let pattern = format!("%{}%", keyword);
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM book_difficulty \
             WHERE book_name LIKE ?1 ORDER BY difficulty_score ASC, id ASC"
        );
        self.collect_records(&sql, &[&pattern])
    }

    pub fn count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM book_difficulty", [], |row| row.get(0))
    }
}

/// Derives a book title from a file name: extension and common numeric
/// prefixes ("001_", "01.", "1-") are stripped. Authors are never inferred.
pub fn parse_book_info(file_name: &str) -> (String, Option<String>) {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let title = stem
        .trim_start_matches(|c: char| {
            c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | '。' | '_' | '-')
        })
        .trim()
        .to_string();
    (title, None)
}
