use chapterforge::epub::DEFAULT_CONFIG_PATH;
use chapterforge::{EpubParser, ExtractConfig, ParsedBook, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// 📚 ChapterForge - EPUB章节提取工具
#[derive(Parser)]
#[command(name = "chapterforge")]
#[command(about = "将EPUB电子书拆分为有序的纯文本章节")]
#[command(version)]
struct Args {
    /// EPUB文件路径
    #[arg(help = "要处理的EPUB文件路径", required_unless_present = "init_config")]
    epub_file: Option<PathBuf>,

    /// 详细输出模式
    #[arg(short, long, help = "输出调试日志")]
    verbose: bool,

    /// 以JSON格式输出完整解析结果
    #[arg(long, help = "以JSON格式输出书名、作者和全部章节")]
    json: bool,

    /// 显示指定章节内容
    #[arg(short, long, help = "显示指定章节的内容（从1开始）")]
    chapter: Option<usize>,

    /// 章节内容最大显示长度
    #[arg(long, default_value = "2000", help = "章节内容最大显示字符数（0表示不限制）")]
    max_length: usize,

    /// 提取配置文件
    #[arg(long, help = "提取配置文件路径（默认读取当前目录下的chapterforge.yaml）")]
    config: Option<PathBuf>,

    /// 生成默认配置文件
    #[arg(long, value_name = "FILE", help = "将默认配置写入指定文件后退出")]
    init_config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ 错误: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    if let Some(path) = &args.init_config {
        ExtractConfig::default().save(path)?;
        println!("✅ 已生成配置文件: {}", path.display());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => ExtractConfig::from_file(path)?,
        None => ExtractConfig::load_or_default(DEFAULT_CONFIG_PATH)?,
    };

    let Some(epub_file) = &args.epub_file else {
        return Ok(());
    };

    let bytes = std::fs::read(epub_file)?;
    let book = EpubParser::new(config).parse(bytes)?;

    if args.json {
        match serde_json::to_string_pretty(&book) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("❌ JSON序列化失败: {}", e),
        }
        return Ok(());
    }

    display_summary(&book);

    if let Some(index) = args.chapter {
        display_chapter_content(&book, index, args.max_length);
    }

    Ok(())
}

/// 显示书籍信息和章节列表
fn display_summary(book: &ParsedBook) {
    println!("📚 《{}》", book.title);
    println!("  作者: {}", book.author);
    println!("  章节: {} 个", book.sections.len());

    for (i, section) in book.sections.iter().enumerate() {
        println!(
            "    {}. {} ({} 字) [顺序: {}]",
            i + 1,
            section.title,
            section.content.chars().count(),
            section.order
        );
    }
}

/// 显示指定章节内容
fn display_chapter_content(book: &ParsedBook, chapter_index: usize, max_length: usize) {
    println!("\n📖 章节内容:");

    // 用户输入从1开始
    if chapter_index == 0 || chapter_index > book.sections.len() {
        println!(
            "  ❌ 无效的章节索引: {}。可用范围: 1-{}",
            chapter_index,
            book.sections.len()
        );
        return;
    }

    let section = &book.sections[chapter_index - 1];
    println!("  📄 章节 {}: {}", chapter_index, section.title);
    println!("{}", "─".repeat(60));

    let total = section.content.chars().count();
    if max_length > 0 && total > max_length {
        let shown: String = section.content.chars().take(max_length).collect();
        println!("{}", shown);
        println!("\n  ... (已截断，共 {} 字，显示前 {} 字)", total, max_length);
    } else {
        println!("{}", section.content);
    }
}
