//! Intent classification over normalized text.
//!
//! The classifier is an ordered set of independent, anchored pattern rules.
//! Every rule is tried against the whole string and all matches are
//! collected: zero matches rejects the message, more than one rejects it as
//! ambiguous. The ambiguity branch is a safety net against overlapping
//! grammars and must never be replaced by a first-match dispatch.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use crate::{
    EngineError, Money, ResultEngine, accounts::AccountKind, expenses::SourceType,
};

/// Credit-card metric requested by a `CREDIT_CARD_QUERY`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardMetric {
    Due,
    AvailableCredit,
    Outstanding,
}

impl CardMetric {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "due" => Some(Self::Due),
            "available credit" => Some(Self::AvailableCredit),
            "outstanding" => Some(Self::Outstanding),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelativePeriod {
    ThisMonth,
    LastMonth,
}

/// Window selector of a `SUMMARY_QUERY`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummaryPeriod {
    Month {
        /// Month token as the user typed it, kept for the reply text.
        name: String,
        number: u32,
        year: Option<i32>,
    },
    Relative(RelativePeriod),
}

/// A classified command with its typed fields.
///
/// One variant per intent of the vocabulary; downstream code never sees a
/// string/value map, so a missing field is a compile error rather than a
/// runtime lookup failure.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    ExpenseCreate {
        amount: Money,
        currency: Option<String>,
        category: String,
        source: String,
        source_type: SourceType,
        card_last4: Option<String>,
        date: Option<NaiveDate>,
    },
    ExpenseUpdate {
        expense_id: i32,
        amount: Option<Money>,
        currency: Option<String>,
        category: Option<String>,
        source: Option<String>,
        source_type: Option<SourceType>,
        card_last4: Option<String>,
        date: Option<NaiveDate>,
    },
    ExpenseDelete {
        expense_id: i32,
    },
    BalanceQuery {
        source: String,
        source_type: SourceType,
        card_last4: Option<String>,
    },
    SummaryQuery {
        period: SummaryPeriod,
    },
    CreditCardQuery {
        metric: CardMetric,
        source: String,
        card_last4: Option<String>,
    },
    AccountList,
    CardList,
    TransactionList,
    CategoryList,
    LoanList,
    LoanUpsert {
        name: String,
        amount: Money,
        description: Option<String>,
    },
    LoanPayment {
        name: String,
        amount: Money,
        date: Option<NaiveDate>,
    },
    AccountUpsert {
        name: String,
        kind: AccountKind,
        balance: Money,
    },
    CardUpsert {
        issuer: String,
        credit_limit: Money,
        billing_cycle_day: Option<u8>,
        last4: Option<String>,
    },
    CurrencySet {
        code: String,
    },
    Help {
        topic: Option<String>,
    },
}

impl Intent {
    /// Intent vocabulary name, persisted as `parsed_intent` on the message.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExpenseCreate { .. } => "EXPENSE_CREATE",
            Self::ExpenseUpdate { .. } => "EXPENSE_UPDATE",
            Self::ExpenseDelete { .. } => "EXPENSE_DELETE",
            Self::BalanceQuery { .. } => "BALANCE_QUERY",
            Self::SummaryQuery { .. } => "SUMMARY_QUERY",
            Self::CreditCardQuery { .. } => "CREDIT_CARD_QUERY",
            Self::AccountList => "ACCOUNT_LIST",
            Self::CardList => "CARD_LIST",
            Self::TransactionList => "TRANSACTION_LIST",
            Self::CategoryList => "CATEGORY_LIST",
            Self::LoanList => "LOAN_LIST",
            Self::LoanUpsert { .. } => "LOAN_UPSERT",
            Self::LoanPayment { .. } => "LOAN_PAYMENT",
            Self::AccountUpsert { .. } => "ACCOUNT_UPSERT",
            Self::CardUpsert { .. } => "CARD_UPSERT",
            Self::CurrencySet { .. } => "CURRENCY_SET",
            Self::Help { .. } => "HELP",
        }
    }
}

type Builder = fn(&Captures<'_>) -> ResultEngine<Intent>;

struct Rule {
    name: &'static str,
    pattern: Regex,
    build: Builder,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, build: Builder) -> Self {
        #[allow(clippy::expect_used)]
        let pattern = Regex::new(pattern).expect("static rule pattern must compile");
        Self {
            name,
            pattern,
            build,
        }
    }
}

// Shared capture grammar fragments. `AMOUNT` constrains the digit shape so a
// malformed numeric can never reach the ledger.
const AMOUNT: &str = r"\d+(?:\.\d{1,2})?";
const NAME: &str = r"[a-z0-9][a-z0-9 ]{1,30}[a-z0-9]";
const WORDS: &str = r"[a-z][a-z ]{1,30}[a-z]";
const DATE: &str = r"\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}";
const MONTH: &str = "jan|january|feb|february|mar|march|apr|april|may|jun|june|\
                     jul|july|aug|august|sep|sept|september|oct|october|nov|\
                     november|dec|december";

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(
            "expense_create_card",
            &format!(
                r"^spent (?P<amount>{AMOUNT}) ?(?P<currency>inr)? on (?P<category>{WORDS}) from (?P<source>{NAME}) card(?: last4 (?P<last4>\d{{4}}))?(?: on (?P<date>{DATE}))?$"
            ),
            build_expense_create_card,
        ),
        Rule::new(
            "expense_create_account",
            &format!(
                r"^spent (?P<amount>{AMOUNT}) ?(?P<currency>inr)? on (?P<category>{WORDS}) from (?P<source>{NAME}) (?P<source_type>account|cash)(?: on (?P<date>{DATE}))?$"
            ),
            build_expense_create_account,
        ),
        Rule::new(
            "expense_update",
            &format!(
                // Lazy category capture: a greedy one would swallow a
                // following `source … card` clause into the category text.
                r"^update expense (?P<expense_id>\d+) amount (?P<amount>{AMOUNT}) ?(?P<currency>inr)?(?: category (?P<category>[a-z][a-z ]{{1,30}}?[a-z]))?(?: source (?P<source>{NAME}) (?P<source_type>card|account|cash)(?: last4 (?P<last4>\d{{4}}))?)?(?: on (?P<date>{DATE}))?$"
            ),
            build_expense_update,
        ),
        Rule::new(
            "expense_delete",
            r"^(?:delete|remove) expense (?P<expense_id>\d+)$",
            build_expense_delete,
        ),
        Rule::new(
            "balance_query_account",
            &format!(r"^balance of (?P<source>{NAME}) (?P<source_type>account|cash)$"),
            build_balance_query_account,
        ),
        Rule::new(
            "balance_query_card",
            &format!(r"^balance of (?P<source>{NAME}) card(?: last4 (?P<last4>\d{{4}}))?$"),
            build_balance_query_card,
        ),
        Rule::new(
            "summary_query_month",
            &format!(
                r"^(?:show|summary) expenses for (?P<month>{MONTH})(?: (?P<year>20\d{{2}}))?$"
            ),
            build_summary_month,
        ),
        Rule::new(
            "summary_query_relative",
            r"^(?:show|summary) expenses (?P<relative_period>this month|last month)$",
            build_summary_relative,
        ),
        Rule::new(
            "credit_card_query",
            &format!(
                r"^(?P<metric>due|available credit|outstanding) for (?P<source>{NAME}) card(?: last4 (?P<last4>\d{{4}}))?$"
            ),
            build_credit_card_query,
        ),
        Rule::new("account_list", r"^(?:(?:list|show) )?accounts$", |_| {
            Ok(Intent::AccountList)
        }),
        Rule::new("card_list", r"^(?:(?:list|show) )?cards$", |_| {
            Ok(Intent::CardList)
        }),
        Rule::new(
            "transaction_list",
            r"^(?:(?:list|show) )?(?:transactions|expenses)$",
            |_| Ok(Intent::TransactionList),
        ),
        Rule::new("category_list", r"^(?:(?:list|show) )?categories$", |_| {
            Ok(Intent::CategoryList)
        }),
        Rule::new("loan_list", r"^(?:(?:list|show) )?loans$", |_| {
            Ok(Intent::LoanList)
        }),
        Rule::new(
            "loan_upsert",
            &format!(
                r"^(?:add|create|set) loan (?P<name>{NAME}) amount (?P<amount>{AMOUNT})(?: description (?P<description>.+))?$"
            ),
            build_loan_upsert,
        ),
        Rule::new(
            "loan_payment",
            &format!(
                r"^pay loan (?P<name>{NAME}) amount (?P<amount>{AMOUNT})(?: on (?P<date>{DATE}))?$"
            ),
            build_loan_payment,
        ),
        Rule::new(
            "account_upsert",
            &format!(
                r"^(?:add|create|update|set) account (?P<name>{NAME}) (?P<kind>account|cash) balance (?P<balance>{AMOUNT})$"
            ),
            build_account_upsert,
        ),
        Rule::new(
            "card_upsert",
            &format!(
                r"^(?:add|create|update|set) card (?P<issuer>{NAME}) limit (?P<limit>{AMOUNT})(?: cycle (?P<cycle>\d{{1,2}}))?(?: last4 (?P<last4>\d{{4}}))?$"
            ),
            build_card_upsert,
        ),
        Rule::new(
            "currency_set",
            r"^(?:set|update) (?:default )?currency (?P<code>[a-z]{3})$",
            build_currency_set,
        ),
        Rule::new(
            "help",
            r"^(?:help|commands)(?: (?P<topic>[a-z][a-z ]{0,30}))?$",
            build_help,
        ),
    ]
});

/// Classifies a normalized line into exactly one [`Intent`].
///
/// Runs **every** rule: no match fails with an unsupported-format routing
/// error, more than one match fails as ambiguous. Fields of the sole match
/// are built afterwards, so a build failure (e.g. an impossible date) never
/// masks an ambiguity.
pub fn classify(normalized: &str) -> ResultEngine<Intent> {
    classify_with(&RULES, normalized).map(|(_, intent)| intent)
}

fn classify_with<'r>(rules: &'r [Rule], text: &str) -> ResultEngine<(&'r str, Intent)> {
    let mut matched: Vec<(&Rule, Captures<'_>)> = Vec::new();
    for rule in rules {
        if let Some(captures) = rule.pattern.captures(text) {
            matched.push((rule, captures));
        }
    }

    match matched.len() {
        0 => Err(EngineError::Routing(
            "Unsupported message format.".to_string(),
        )),
        1 => {
            let (rule, captures) = &matched[0];
            let intent = (rule.build)(captures)?;
            Ok((rule.name, intent))
        }
        _ => Err(EngineError::Routing(
            "Ambiguous input. Please clarify your request.".to_string(),
        )),
    }
}

fn capture<'t>(captures: &Captures<'t>, name: &str) -> Option<&'t str> {
    captures.name(name).map(|m| m.as_str())
}

fn required<'t>(captures: &Captures<'t>, name: &str) -> ResultEngine<&'t str> {
    capture(captures, name)
        .ok_or_else(|| EngineError::Routing("Unsupported message format.".to_string()))
}

fn parse_amount(raw: &str) -> ResultEngine<Money> {
    raw.parse()
}

fn parse_id(raw: &str) -> ResultEngine<i32> {
    raw.parse()
        .map_err(|_| EngineError::Validation("Invalid expense id.".to_string()))
}

fn parse_date(raw: &str) -> ResultEngine<NaiveDate> {
    let format = if raw.contains('-') { "%Y-%m-%d" } else { "%d/%m/%Y" };
    NaiveDate::parse_from_str(raw, format)
        .map_err(|_| EngineError::Validation("Invalid date.".to_string()))
}

fn parse_optional_date(captures: &Captures<'_>) -> ResultEngine<Option<NaiveDate>> {
    capture(captures, "date").map(parse_date).transpose()
}

fn month_number(name: &str) -> Option<u32> {
    let number = match name {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(number)
}

fn build_expense_create_card(captures: &Captures<'_>) -> ResultEngine<Intent> {
    Ok(Intent::ExpenseCreate {
        amount: parse_amount(required(captures, "amount")?)?,
        currency: capture(captures, "currency").map(str::to_string),
        category: required(captures, "category")?.to_string(),
        source: required(captures, "source")?.to_string(),
        // The card grammar never captures a source type; it is implied.
        source_type: SourceType::Card,
        card_last4: capture(captures, "last4").map(str::to_string),
        date: parse_optional_date(captures)?,
    })
}

fn build_expense_create_account(captures: &Captures<'_>) -> ResultEngine<Intent> {
    let kind = required(captures, "source_type")?;
    Ok(Intent::ExpenseCreate {
        amount: parse_amount(required(captures, "amount")?)?,
        currency: capture(captures, "currency").map(str::to_string),
        category: required(captures, "category")?.to_string(),
        source: required(captures, "source")?.to_string(),
        source_type: SourceType::parse(kind)
            .ok_or_else(|| EngineError::Routing("Unsupported message format.".to_string()))?,
        card_last4: None,
        date: parse_optional_date(captures)?,
    })
}

fn build_expense_update(captures: &Captures<'_>) -> ResultEngine<Intent> {
    let source_type = capture(captures, "source_type")
        .map(|token| {
            SourceType::parse(token)
                .ok_or_else(|| EngineError::Routing("Unsupported message format.".to_string()))
        })
        .transpose()?;
    Ok(Intent::ExpenseUpdate {
        expense_id: parse_id(required(captures, "expense_id")?)?,
        amount: capture(captures, "amount").map(parse_amount).transpose()?,
        currency: capture(captures, "currency").map(str::to_string),
        category: capture(captures, "category").map(str::to_string),
        source: capture(captures, "source").map(str::to_string),
        source_type,
        card_last4: capture(captures, "last4").map(str::to_string),
        date: parse_optional_date(captures)?,
    })
}

fn build_expense_delete(captures: &Captures<'_>) -> ResultEngine<Intent> {
    Ok(Intent::ExpenseDelete {
        expense_id: parse_id(required(captures, "expense_id")?)?,
    })
}

fn build_balance_query_account(captures: &Captures<'_>) -> ResultEngine<Intent> {
    let kind = required(captures, "source_type")?;
    Ok(Intent::BalanceQuery {
        source: required(captures, "source")?.to_string(),
        source_type: SourceType::parse(kind)
            .ok_or_else(|| EngineError::Routing("Unsupported message format.".to_string()))?,
        card_last4: None,
    })
}

fn build_balance_query_card(captures: &Captures<'_>) -> ResultEngine<Intent> {
    Ok(Intent::BalanceQuery {
        source: required(captures, "source")?.to_string(),
        source_type: SourceType::Card,
        card_last4: capture(captures, "last4").map(str::to_string),
    })
}

fn build_summary_month(captures: &Captures<'_>) -> ResultEngine<Intent> {
    let name = required(captures, "month")?;
    let number = month_number(name)
        .ok_or_else(|| EngineError::Validation("Invalid month.".to_string()))?;
    let year = capture(captures, "year")
        .map(|raw| {
            raw.parse::<i32>()
                .map_err(|_| EngineError::Validation("Invalid year.".to_string()))
        })
        .transpose()?;
    Ok(Intent::SummaryQuery {
        period: SummaryPeriod::Month {
            name: name.to_string(),
            number,
            year,
        },
    })
}

fn build_summary_relative(captures: &Captures<'_>) -> ResultEngine<Intent> {
    let period = match required(captures, "relative_period")? {
        "this month" => RelativePeriod::ThisMonth,
        _ => RelativePeriod::LastMonth,
    };
    Ok(Intent::SummaryQuery {
        period: SummaryPeriod::Relative(period),
    })
}

fn build_credit_card_query(captures: &Captures<'_>) -> ResultEngine<Intent> {
    let metric = CardMetric::parse(required(captures, "metric")?)
        .ok_or_else(|| EngineError::Routing("Unsupported message format.".to_string()))?;
    Ok(Intent::CreditCardQuery {
        metric,
        source: required(captures, "source")?.to_string(),
        card_last4: capture(captures, "last4").map(str::to_string),
    })
}

fn build_loan_upsert(captures: &Captures<'_>) -> ResultEngine<Intent> {
    Ok(Intent::LoanUpsert {
        name: required(captures, "name")?.to_string(),
        amount: parse_amount(required(captures, "amount")?)?,
        description: capture(captures, "description").map(str::to_string),
    })
}

fn build_loan_payment(captures: &Captures<'_>) -> ResultEngine<Intent> {
    Ok(Intent::LoanPayment {
        name: required(captures, "name")?.to_string(),
        amount: parse_amount(required(captures, "amount")?)?,
        date: parse_optional_date(captures)?,
    })
}

fn build_account_upsert(captures: &Captures<'_>) -> ResultEngine<Intent> {
    let kind = AccountKind::parse(required(captures, "kind")?)
        .ok_or_else(|| EngineError::Routing("Unsupported message format.".to_string()))?;
    Ok(Intent::AccountUpsert {
        name: required(captures, "name")?.to_string(),
        kind,
        balance: parse_amount(required(captures, "balance")?)?,
    })
}

fn build_card_upsert(captures: &Captures<'_>) -> ResultEngine<Intent> {
    let cycle = capture(captures, "cycle")
        .map(|raw| {
            raw.parse::<u8>()
                .map_err(|_| EngineError::Validation("Billing cycle day must be between 1 and 31.".to_string()))
        })
        .transpose()?;
    Ok(Intent::CardUpsert {
        issuer: required(captures, "issuer")?.to_string(),
        credit_limit: parse_amount(required(captures, "limit")?)?,
        billing_cycle_day: cycle,
        last4: capture(captures, "last4").map(str::to_string),
    })
}

fn build_currency_set(captures: &Captures<'_>) -> ResultEngine<Intent> {
    Ok(Intent::CurrencySet {
        code: required(captures, "code")?.to_string(),
    })
}

fn build_help(captures: &Captures<'_>) -> ResultEngine<Intent> {
    Ok(Intent::Help {
        topic: capture(captures, "topic").map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize;

    fn classify_text(raw: &str) -> ResultEngine<Intent> {
        classify(&normalize(raw))
    }

    #[test]
    fn card_expense_implies_card_source() {
        for amount in ["1", "45.5", "1200.75", "999999"] {
            let intent = classify_text(&format!("spent {amount} on groceries from hdfc card"))
                .unwrap();
            match intent {
                Intent::ExpenseCreate {
                    source,
                    source_type,
                    category,
                    ..
                } => {
                    assert_eq!(source_type, SourceType::Card);
                    assert_eq!(source, "hdfc");
                    assert_eq!(category, "groceries");
                }
                other => panic!("unexpected intent: {other:?}"),
            }
        }
    }

    #[test]
    fn card_expense_with_last4_and_date() {
        let intent = classify_text("spent 900 on fuel from hdfc card last4 1234 on 2024-09-01")
            .unwrap();
        assert_eq!(
            intent,
            Intent::ExpenseCreate {
                amount: Money::new(900_00),
                currency: None,
                category: "fuel".to_string(),
                source: "hdfc".to_string(),
                source_type: SourceType::Card,
                card_last4: Some("1234".to_string()),
                date: NaiveDate::from_ymd_opt(2024, 9, 1),
            }
        );
    }

    #[test]
    fn account_expense_with_currency_token() {
        let intent = classify_text("paid 450 rs on electricity from sbi account").unwrap();
        assert_eq!(
            intent,
            Intent::ExpenseCreate {
                amount: Money::new(450_00),
                currency: Some("inr".to_string()),
                category: "electricity".to_string(),
                source: "sbi".to_string(),
                source_type: SourceType::Account,
                card_last4: None,
                date: None,
            }
        );
    }

    #[test]
    fn update_with_source_switch() {
        let intent =
            classify_text("update expense 23 amount 2500 category rent source hdfc card on 2024-09-01")
                .unwrap();
        assert_eq!(
            intent,
            Intent::ExpenseUpdate {
                expense_id: 23,
                amount: Some(Money::new(2500_00)),
                currency: None,
                category: Some("rent".to_string()),
                source: Some("hdfc".to_string()),
                source_type: Some(SourceType::Card),
                card_last4: None,
                date: NaiveDate::from_ymd_opt(2024, 9, 1),
            }
        );
    }

    #[test]
    fn delete_and_remove_are_equivalent() {
        assert_eq!(
            classify_text("delete expense 7").unwrap(),
            Intent::ExpenseDelete { expense_id: 7 }
        );
        assert_eq!(
            classify_text("remove expense 7").unwrap(),
            Intent::ExpenseDelete { expense_id: 7 }
        );
    }

    #[test]
    fn balance_queries_split_on_source_keyword() {
        assert_eq!(
            classify_text("balance of sbi account").unwrap(),
            Intent::BalanceQuery {
                source: "sbi".to_string(),
                source_type: SourceType::Account,
                card_last4: None,
            }
        );
        assert_eq!(
            classify_text("balance of hdfc card last4 1234").unwrap(),
            Intent::BalanceQuery {
                source: "hdfc".to_string(),
                source_type: SourceType::Card,
                card_last4: Some("1234".to_string()),
            }
        );
    }

    #[test]
    fn summary_by_month_and_relative() {
        assert_eq!(
            classify_text("show expenses for september 2024").unwrap(),
            Intent::SummaryQuery {
                period: SummaryPeriod::Month {
                    name: "september".to_string(),
                    number: 9,
                    year: Some(2024),
                },
            }
        );
        assert_eq!(
            classify_text("summary expenses last month").unwrap(),
            Intent::SummaryQuery {
                period: SummaryPeriod::Relative(RelativePeriod::LastMonth),
            }
        );
    }

    #[test]
    fn credit_card_metrics() {
        let intent = classify_text("available credit for hdfc card").unwrap();
        assert_eq!(
            intent,
            Intent::CreditCardQuery {
                metric: CardMetric::AvailableCredit,
                source: "hdfc".to_string(),
                card_last4: None,
            }
        );
        assert!(matches!(
            classify_text("due for hdfc card last4 1234").unwrap(),
            Intent::CreditCardQuery {
                metric: CardMetric::Due,
                ..
            }
        ));
    }

    #[test]
    fn list_shapes() {
        assert_eq!(classify_text("accounts").unwrap(), Intent::AccountList);
        assert_eq!(classify_text("list accounts").unwrap(), Intent::AccountList);
        assert_eq!(classify_text("show cards").unwrap(), Intent::CardList);
        assert_eq!(classify_text("transactions").unwrap(), Intent::TransactionList);
        assert_eq!(classify_text("list expenses").unwrap(), Intent::TransactionList);
        assert_eq!(classify_text("list categories").unwrap(), Intent::CategoryList);
        assert_eq!(classify_text("show loans").unwrap(), Intent::LoanList);
    }

    #[test]
    fn loan_commands() {
        assert_eq!(
            classify_text("add loan home amount 500000 description home renovation").unwrap(),
            Intent::LoanUpsert {
                name: "home".to_string(),
                amount: Money::new(500_000_00),
                description: Some("home renovation".to_string()),
            }
        );
        assert_eq!(
            classify_text("pay loan home amount 15000 on 2024-01-15").unwrap(),
            Intent::LoanPayment {
                name: "home".to_string(),
                amount: Money::new(15_000_00),
                date: NaiveDate::from_ymd_opt(2024, 1, 15),
            }
        );
    }

    #[test]
    fn upsert_commands() {
        assert_eq!(
            classify_text("add account sbi account balance 12000").unwrap(),
            Intent::AccountUpsert {
                name: "sbi".to_string(),
                kind: AccountKind::Bank,
                balance: Money::new(12_000_00),
            }
        );
        assert_eq!(
            classify_text("add card hdfc limit 50000 cycle 5 last4 1234").unwrap(),
            Intent::CardUpsert {
                issuer: "hdfc".to_string(),
                credit_limit: Money::new(50_000_00),
                billing_cycle_day: Some(5),
                last4: Some("1234".to_string()),
            }
        );
    }

    #[test]
    fn currency_and_help() {
        assert_eq!(
            classify_text("set currency usd").unwrap(),
            Intent::CurrencySet {
                code: "usd".to_string(),
            }
        );
        assert_eq!(
            classify_text("set default currency sar").unwrap(),
            Intent::CurrencySet {
                code: "sar".to_string(),
            }
        );
        assert_eq!(classify_text("help").unwrap(), Intent::Help { topic: None });
        assert_eq!(
            classify_text("help loans").unwrap(),
            Intent::Help {
                topic: Some("loans".to_string()),
            }
        );
    }

    #[test]
    fn unsupported_format_is_a_routing_error() {
        assert_eq!(
            classify_text("hello there"),
            Err(EngineError::Routing("Unsupported message format.".to_string()))
        );
        assert_eq!(
            classify_text("spent on groceries"),
            Err(EngineError::Routing("Unsupported message format.".to_string()))
        );
    }

    #[test]
    fn impossible_date_fails_validation_not_routing() {
        assert_eq!(
            classify_text("spent 100 on groceries from hdfc card on 2024-13-40"),
            Err(EngineError::Validation("Invalid date.".to_string()))
        );
    }

    #[test]
    fn overlapping_rules_are_rejected_as_ambiguous() {
        let rules = vec![
            Rule::new("first", r"^balance of (?P<source>[a-z]+) everything$", |_| {
                Ok(Intent::AccountList)
            }),
            Rule::new("second", r"^balance of hdfc (?P<rest>[a-z]+)$", |_| {
                Ok(Intent::CardList)
            }),
        ];
        assert_eq!(
            classify_with(&rules, "balance of hdfc everything"),
            Err(EngineError::Routing(
                "Ambiguous input. Please clarify your request.".to_string()
            ))
        );
    }

    #[test]
    fn production_rules_never_overlap_on_canonical_commands() {
        // Every line of the general help must classify to exactly one rule.
        for command in [
            "spent 1200 on groceries from hdfc card",
            "spent 450 on electricity from sbi account",
            "spent 300 on snacks from wallet cash",
            "spent 900 on fuel from hdfc card last4 1234",
            "update expense 23 amount 2500 category rent source hdfc card on 2024-09-01",
            "delete expense 23",
            "balance of sbi account",
            "balance of hdfc card last4 1234",
            "show expenses for september 2024",
            "summary expenses this month",
            "available credit for hdfc card",
            "add account sbi account balance 12000",
            "add card hdfc limit 50000 cycle 5 last4 1234",
            "add loan home amount 500000 description home renovation",
            "pay loan home amount 15000 on 2024-01-15",
            "list accounts",
            "show cards",
            "list categories",
            "list loans",
            "list transactions",
            "set currency usd",
            "help",
        ] {
            assert!(
                classify_text(command).is_ok(),
                "command did not classify cleanly: {command}"
            );
        }
    }
}
