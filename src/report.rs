use crate::analyze::BookAnalysis;
use crate::db::BookRecord;
use crate::freq::FreqTable;
use crate::reference::RankMap;
use chrono::Local;
use itertools::Itertools;
use std::fmt::Write as _;
use std::path::Path;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width under East Asian Width rules: fullwidth, wide and
/// ambiguous characters (including ★/☆) count as two columns.
pub fn display_width(text: &str) -> usize {
    text.width_cjk()
}

/// Fixed-column text table. Cells are truncated or space-padded to the
/// configured display widths so CJK titles line up with ASCII numbers.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    widths: Vec<usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str], widths: &[usize]) -> Self {
        assert_eq!(headers.len(), widths.len());
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            widths: widths.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn add_row<I, S>(&mut self, cols: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cols.into_iter().map(Into::into).collect());
    }

    fn format_cell(text: &str, target: usize) -> String {
        let width = display_width(text);
        if width > target {
            let mut truncated = String::new();
            let mut used = 0;
            for c in text.chars() {
                let w = c.width_cjk().unwrap_or(0);
                if used + w > target {
                    break;
                }
                truncated.push(c);
                used += w;
            }
            return truncated;
        }
        let mut cell = text.to_string();
        cell.push_str(&" ".repeat(target - width));
        cell
    }

    pub fn total_width(&self) -> usize {
        self.widths.iter().sum::<usize>() + self.widths.len().saturating_sub(1)
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        let header = self
            .headers
            .iter()
            .zip(&self.widths)
            .map(|(h, &w)| Self::format_cell(h, w))
            .join(" ");
        lines.push(header);
        lines.push("-".repeat(self.total_width()));
        for row in &self.rows {
            let line = row
                .iter()
                .zip(&self.widths)
                .map(|(col, &w)| Self::format_cell(col, w))
                .join(" ");
            lines.push(line);
        }
        lines.join("\n")
    }
}

fn fmt_order(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "无数据".to_string(),
    }
}

/// Full per-book difficulty report, mirroring what the analyzer computed:
/// rating with the dimension breakdown, rarity, coverage and cumulative
/// tables, and the detailed frequency table (ranked characters in
/// dictionary order, then unranked ones by count).
pub fn book_report(
    file_name: &str,
    encoding_name: &str,
    freq: &FreqTable,
    rank: &RankMap,
    analysis: &BookAnalysis,
) -> String {
    let mut out = String::new();
    let rule = "=".repeat(80);
    let thin = "-".repeat(80);
    let d = &analysis.difficulty;

    let _ = writeln!(out, "{rule}\n【书籍难度分析报告】\n{rule}\n");
    let _ = writeln!(out, "文件名: {file_name}");
    let _ = writeln!(out, "文件编码: {encoding_name}");
    let _ = writeln!(out, "总字符数: {}", analysis.total_chars);
    let _ = writeln!(
        out,
        "字种数: {} 个（表内: {} 个，表外: {} 个）",
        analysis.distinct_chars,
        analysis.distinct_chars - analysis.extra_char_types,
        analysis.extra_char_types
    );
    let _ = writeln!(out, "{rule}\n");

    // Rating and the per-dimension breakdown.
    let _ = writeln!(out, "1. 书籍难度评级");
    let _ = writeln!(out, "   {}  （难度分数：{:.1}/100）\n", d.stars, d.score);

    let labels = [
        ("前500字覆盖率", &d.coverage_500),
        ("前1000字覆盖率", &d.coverage_1000),
        ("前1500字覆盖率", &d.coverage_1500),
        ("95%覆盖所需字数", &d.chars_95),
        ("99%覆盖所需字数", &d.chars_99),
        ("95%平均字序", &d.order_95),
        ("99%平均字序", &d.order_99),
        ("表外字种数", &d.char_types),
    ];
    let _ = writeln!(out, "   评分明细（仅列出权重>0的维度）：");
    for (label, detail) in labels {
        if detail.weight > 0.0 {
            let input = detail
                .input
                .map(|v| format!("{v:.1}"))
                .unwrap_or_else(|| "无数据".to_string());
            let _ = writeln!(
                out,
                "     {label}: {input} → 得分 {:.2}/{}",
                detail.earned, detail.weight
            );
        }
    }
    let _ = writeln!(
        out,
        "   归一化: ({:.2} / {:.2}) × 100 = {:.1} 分\n",
        d.raw_score, d.total_weight, d.score
    );

    // Rarity.
    let rarity = &analysis.rarity;
    let _ = writeln!(out, "2. 生僻字分析");
    let _ = writeln!(
        out,
        "   生僻字字种数：{} 个（占字种 {:.2}%）",
        rarity.rare_type_count,
        rarity.rare_type_ratio * 100.0
    );
    let _ = writeln!(
        out,
        "   生僻字出现次数：{} 次（占文本 {:.2}%）",
        rarity.rare_char_count,
        rarity.rare_char_ratio * 100.0
    );
    if !rarity.rare_chars.is_empty() {
        let top = rarity
            .rare_chars
            .iter()
            .take(20)
            .map(|(c, n)| format!("{c}({n})"))
            .join("、");
        let _ = writeln!(out, "   最常见的生僻字（前20个）：{top}");
    }
    let _ = writeln!(out, "\n{rule}\n");

    // Coverage table.
    let _ = writeln!(out, "【高频字覆盖率分析】");
    let mut coverage_table = Table::new(&["区间", "累计次数", "覆盖率", "平均出现次数"], &[12, 15, 15, 15]);
    for (n, stat) in &analysis.coverage {
        coverage_table.add_row([
            format!("前{n}"),
            stat.total_count.to_string(),
            format!("{:.2}%", stat.coverage),
            format!("{:.1}", stat.avg_count),
        ]);
    }
    for line in coverage_table.render().lines() {
        let _ = writeln!(out, "   {line}");
    }

    // Cumulative coverage table.
    let _ = writeln!(out, "\n【累积覆盖分析】");
    let mut cumulative_table = Table::new(&["覆盖率", "所需字数"], &[15, 15]);
    for point in &analysis.cumulative {
        cumulative_table.add_row([format!("{:.2}%", point.actual_pct), point.char_count.to_string()]);
    }
    for line in cumulative_table.render().lines() {
        let _ = writeln!(out, "   {line}");
    }
    let _ = writeln!(
        out,
        "\n   95%覆盖：{} 字（表内 {}，表外 {}），平均字序 {}",
        analysis.chars_95,
        analysis.chars_95_in_head,
        analysis.chars_95_out_head,
        fmt_order(analysis.avg_order_95)
    );
    let _ = writeln!(
        out,
        "   99%覆盖：{} 字（表内 {}，表外 {}），平均字序 {}",
        analysis.chars_99,
        analysis.chars_99_in_head,
        analysis.chars_99_out_head,
        fmt_order(analysis.avg_order_99)
    );

    // Top/low frequency notes.
    let by_freq = freq.by_count_desc();
    if let Some(&(top_char, top_count)) = by_freq.first() {
        let _ = writeln!(out, "\n【频次分布】");
        let _ = writeln!(
            out,
            "   最高频字: '{top_char}' 出现 {top_count} 次，占比 {:.2}%",
            top_count as f64 / analysis.total_chars as f64 * 100.0
        );
        let once = by_freq.iter().filter(|&&(_, n)| n == 1).count();
        let _ = writeln!(
            out,
            "   仅出现1次的字: {once} 个 ({:.2}%)",
            once as f64 / analysis.distinct_chars as f64 * 100.0
        );
    }
    let _ = writeln!(out, "\n{rule}\n");

    // Detailed frequency table. Ranked characters in dictionary order
    // first, then the rest by count.
    let _ = writeln!(out, "【详细字频统计表】");
    let mut freq_table = Table::new(&["字", "次数", "比例(%)", "字序"], &[5, 10, 12, 10]);
    let mut ranked: Vec<(char, u64, u32)> = Vec::new();
    let mut unranked: Vec<(char, u64)> = Vec::new();
    for &(c, n) in &by_freq {
        match rank.get(&c) {
            Some(&r) => ranked.push((c, n, r)),
            None => unranked.push((c, n)),
        }
    }
    ranked.sort_by_key(|&(_, _, r)| r);
    for (c, n, r) in ranked {
        freq_table.add_row([
            c.to_string(),
            n.to_string(),
            format!("{:.2}", n as f64 / analysis.total_chars.max(1) as f64 * 100.0),
            r.to_string(),
        ]);
    }
    for (c, n) in unranked {
        freq_table.add_row([
            c.to_string(),
            n.to_string(),
            format!("{:.2}", n as f64 / analysis.total_chars.max(1) as f64 * 100.0),
            "N/A".to_string(),
        ]);
    }
    let _ = writeln!(out, "{}", freq_table.render());
    let _ = writeln!(out, "{thin}");

    out
}

/// Batch summary over many analyzed books, easiest first.
pub fn summary_report(records: &[BookRecord]) -> String {
    let mut sorted: Vec<&BookRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        a.difficulty_score
            .partial_cmp(&b.difficulty_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut out = String::new();
    let rule = "=".repeat(80);
    let _ = writeln!(out, "{rule}\n【所有书籍难度汇总报告】\n{rule}\n");
    let _ = writeln!(out, "统计时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "统计书籍数: {} 本\n", sorted.len());

    let mut table = Table::new(
        &["排名", "书名", "难度", "分数", "字种数", "生僻字"],
        &[6, 30, 22, 8, 8, 8],
    );
    for (idx, record) in sorted.iter().enumerate() {
        table.add_row([
            (idx + 1).to_string(),
            record.book_name.clone(),
            record.star_level.clone(),
            format!("{:.1}", record.difficulty_score),
            record.char_types.to_string(),
            record.rare_char_types.to_string(),
        ]);
    }
    let _ = writeln!(out, "{}", table.render());

    if let (Some(first), Some(last)) = (sorted.first(), sorted.last()) {
        let mean = sorted.iter().map(|r| r.difficulty_score).sum::<f64>() / sorted.len() as f64;
        let _ = writeln!(out, "\n平均难度: {mean:.1} 分");
        let _ = writeln!(out, "最简单: {} ({:.1}分)", first.book_name, first.difficulty_score);
        let _ = writeln!(out, "最困难: {} ({:.1}分)", last.book_name, last.difficulty_score);
    }
    let _ = writeln!(out, "{rule}");
    out
}

/// CSV export of the summary rows, one record per line.
pub fn write_summary_csv(path: &Path, records: &[BookRecord]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "book_name",
        "file_name",
        "difficulty_score",
        "star_level",
        "total_chars",
        "char_types",
        "char_types_out_head",
        "coverage_500",
        "coverage_1000",
        "coverage_1500",
        "chars_95",
        "chars_99",
        "avg_order_95",
        "avg_order_99",
        "rare_char_types",
        "rare_char_ratio",
    ])?;
    for r in records {
        writer.write_record([
            r.book_name.clone(),
            r.file_name.clone(),
            format!("{:.2}", r.difficulty_score),
            r.star_level.clone(),
            r.total_chars.to_string(),
            r.char_types.to_string(),
            r.char_types_out_head.to_string(),
            format!("{:.2}", r.coverage_500),
            format!("{:.2}", r.coverage_1000),
            format!("{:.2}", r.coverage_1500),
            r.chars_95.to_string(),
            r.chars_99.to_string(),
            r.avg_order_95.map(|v| format!("{v:.1}")).unwrap_or_default(),
            r.avg_order_99.map(|v| format!("{v:.1}")).unwrap_or_default(),
            r.rare_char_types.to_string(),
            format!("{:.4}", r.rare_char_ratio),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::Analyzer;
    use crate::scoring::ScoringConfig;

    #[test]
    fn test_display_width_cjk() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("你好"), 4);
        // Stars are ambiguous-width and render wide in CJK terminals.
        assert_eq!(display_width("★☆"), 4);
    }

    #[test]
    fn test_table_alignment() {
        let mut table = Table::new(&["名", "n"], &[8, 4]);
        table.add_row(["书名", "1"]);
        table.add_row(["很长的一个书名", "22"]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        // Header + separator + 2 rows, all padded/truncated to equal width.
        assert_eq!(lines.len(), 4);
        for line in [lines[0], lines[2], lines[3]] {
            assert_eq!(display_width(line), table.total_width());
        }
    }

    #[test]
    fn test_table_truncates_wide_cells() {
        let cell = Table::format_cell("一二三四五", 6);
        assert_eq!(cell, "一二三");
    }

    fn analyzed_record() -> (BookRecord, String) {
        let head = vec!['的', '一'];
        let rank: RankMap = [('的', 1), ('一', 2), ('你', 3)].into_iter().collect();
        let analyzer = Analyzer::new(head, rank.clone(), ScoringConfig::default());
        let freq = FreqTable::from_text(&format!("{}{}你", "的".repeat(60), "一".repeat(39)));
        let analysis = analyzer.analyze(&freq);
        let report = book_report("测试.txt", "UTF-8", &freq, &rank, &analysis);
        let record = BookRecord::from_analysis("测试".into(), None, "测试.txt".into(), &analysis);
        (record, report)
    }

    #[test]
    fn test_book_report_contents() {
        let (_, report) = analyzed_record();
        assert!(report.contains("书籍难度分析报告"));
        assert!(report.contains("总字符数: 100"));
        assert!(report.contains("高频字覆盖率分析"));
        assert!(report.contains("详细字频统计表"));
        // Unranked marker never appears since all chars are ranked.
        assert!(!report.contains("N/A"));
    }

    #[test]
    fn test_summary_report_sorts_by_score() {
        let (record, _) = analyzed_record();
        let mut easy = record.clone();
        easy.book_name = "简单".into();
        easy.difficulty_score = 1.0;
        let mut hard = record.clone();
        hard.book_name = "困难".into();
        hard.difficulty_score = 99.0;

        let summary = summary_report(&[hard, easy]);
        let easy_pos = summary.find("简单").unwrap();
        let hard_pos = summary.find("困难").unwrap();
        assert!(easy_pos < hard_pos);
        assert!(summary.contains("最困难: 困难"));
    }

    #[test]
    fn test_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let (record, _) = analyzed_record();
        write_summary_csv(&path, &[record]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("book_name,"));
        assert!(contents.contains("测试"));
    }
}
