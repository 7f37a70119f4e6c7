use std::collections::HashMap;

use clap::{Parser, Subcommand};
use scorecard::error::{AppResult, run_with_error_handler};
use scorecard::fetch::ResultFetcher;
use scorecard::model::Tier;
use scorecard::view::{Navigator, ResultView, ViewState};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(about = "CLI for browsing surveys and viewing graded results", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List published surveys
    List,

    /// Show the questions of one survey
    Show {
        #[arg(long)]
        survey: String,
    },

    /// Submit answers to a survey
    Submit {
        #[arg(long)]
        survey: String,

        /// One answer as 题目ID=答案; repeatable. The answer is taken as
        /// JSON when it parses (e.g. '["A","C"]'), as plain text otherwise.
        #[arg(long = "answer", value_name = "QID=VALUE")]
        answers: Vec<String>,
    },

    /// Show my result for one survey
    Result {
        #[arg(long)]
        survey: String,
    },
}

/// Terminal stand-in for the navigation destinations: prints where to go
/// next instead of routing there.
struct HintNavigator;

impl Navigator for HintNavigator {
    fn to_survey_list(&mut self) {
        println!("提示：运行 `scorecard-cli list` 查看问卷列表");
    }

    fn to_take_survey(&mut self, survey_id: &str) {
        println!(
            "提示：运行 `scorecard-cli show --survey {survey_id}` 查看题目，再用 `submit` 作答"
        );
    }
}

fn tier_color(tier: Tier) -> &'static str {
    match tier {
        Tier::Perfect => "\x1b[35m",
        Tier::Excellent => "\x1b[32m",
        Tier::Good => "\x1b[36m",
        Tier::Pass => "\x1b[33m",
        Tier::Poor => "\x1b[31m",
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    scorecard::setup_trace();

    run_with_error_handler(run).await;
}

async fn run() -> AppResult<()> {
    let args = Cli::parse();
    let fetcher = scorecard::build_fetcher().await?;

    match args.command {
        Commands::List => {
            let surveys = fetcher.surveys().await?;
            if surveys.is_empty() {
                println!("暂无可用问卷");
            }
            for survey in surveys {
                println!(
                    "{}  [{}] {}（{} 题）",
                    survey.id, survey.release_type, survey.title, survey.question_count
                );
                if let Some(due) = survey.due_date {
                    println!("    截止：{due}");
                }
            }
        }

        Commands::Show { survey } => {
            let detail = fetcher.survey_detail(&survey).await?;
            println!("{}（{}）", detail.title, detail.status);
            if let Some(description) = &detail.description {
                if !description.is_empty() {
                    println!("{description}");
                }
            }
            for (index, question) in detail.questions.iter().enumerate() {
                let optional = if question.required { "" } else { "（选答）" };
                println!("{}. {}{}", index + 1, question.text, optional);
                if let Some(options) = &question.options {
                    for option in options {
                        println!("   {option}");
                    }
                }
            }
        }

        Commands::Submit { survey, answers } => {
            let mut payload: HashMap<String, Value> = HashMap::new();
            for pair in &answers {
                let Some((question, value)) = pair.split_once('=') else {
                    println!("忽略无效作答参数（应为 题目ID=答案）：{pair}");
                    continue;
                };
                let value = serde_json::from_str(value)
                    .unwrap_or_else(|_| Value::String(value.to_string()));
                payload.insert(question.to_string(), value);
            }

            let receipt = fetcher.submit(&survey, &payload).await?;
            println!("{}", receipt.message);
            println!(
                "总分：{} 分，得分率：{}%",
                receipt.total_score, receipt.percentage_score
            );
            if let Some(passed) = receipt.is_passed {
                let verdict = if passed { "通过" } else { "未通过" };
                println!("{verdict}");
            }
        }

        Commands::Result { survey } => {
            let mut view = ResultView::new();
            view.open(survey);
            view.load(&fetcher).await;

            for line in view.render() {
                // grading levels get their tier's color
                match line.strip_prefix("等级：") {
                    Some(level) => {
                        println!("{}{line}\x1b[0m", tier_color(Tier::for_level(level)));
                    }
                    None => println!("{line}"),
                }
            }

            let mut nav = HintNavigator;
            match view.state() {
                ViewState::Error(_) => view.back_to_list(&mut nav),
                ViewState::NotSubmitted => view.start_survey(&mut nav),
                _ => {}
            }
        }
    }

    Ok(())
}
