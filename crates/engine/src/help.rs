//! Help texts: the general command list plus focused topical sections
//! reachable through a small alias vocabulary ("expenses" → transactions,
//! "credit card" → cards, and so on).

const GENERAL: &[&str] = &[
    "Supported commands (use 'help accounts', 'help cards', 'help transactions', 'help categories', 'help loans', 'help summary', or 'help settings' for focused help):",
    "- spent 1200 on groceries from hdfc card",
    "- spent 450 on electricity from sbi account",
    "- spent 300 on snacks from wallet cash",
    "- spent 900 on fuel from hdfc card last4 1234",
    "- update expense 23 amount 2500 category rent source hdfc card on 2024-09-01",
    "- delete expense 23",
    "- balance of sbi account",
    "- balance of hdfc card last4 1234",
    "- show expenses for september 2024",
    "- summary expenses this month",
    "- available credit for hdfc card",
    "- add account sbi account balance 12000",
    "- add card hdfc limit 50000 cycle 5 last4 1234",
    "- add loan home amount 500000 description home renovation",
    "- pay loan home amount 15000 on 2024-01-15",
    "- list accounts",
    "- show cards",
    "- list categories",
    "- list loans",
    "- list transactions",
    "- set currency usd",
];

const ACCOUNTS: &[&str] = &[
    "Accounts help:",
    "- list accounts",
    "- add account sbi account balance 12000",
    "- add account wallet cash balance 500",
    "- balance of sbi account",
    "- balance of wallet cash",
    "- update account sbi account balance 15000",
];

const CARDS: &[&str] = &[
    "Cards help:",
    "- show cards",
    "- add card hdfc limit 50000 cycle 5 last4 1234",
    "- available credit for hdfc card last4 1234",
    "- outstanding for hdfc card",
    "- due for hdfc card last4 1234",
];

const TRANSACTIONS: &[&str] = &[
    "Transactions help:",
    "- spent 1200 on groceries from hdfc card",
    "- spent 450 on electricity from sbi account",
    "- update expense 23 amount 2500 category rent source hdfc card on 2024-09-01",
    "- delete expense 23",
    "- list transactions",
    "- show expenses for september 2024",
];

const CATEGORIES: &[&str] = &[
    "Categories help:",
    "- list categories",
    "- summary expenses this month",
    "- show expenses for september 2024",
    "- summary expenses last month",
];

const LOANS: &[&str] = &[
    "Loans help:",
    "- add loan home amount 500000 description home renovation",
    "- pay loan home amount 15000 on 2024-01-15",
    "- list loans",
];

const SUMMARY: &[&str] = &[
    "Summary help:",
    "- summary expenses this month",
    "- summary expenses last month",
    "- show expenses for september 2024",
    "- show expenses for december 2024",
];

const SETTINGS: &[&str] = &[
    "Settings help:",
    "- set currency usd",
    "- set default currency sar",
    "- update currency eur",
    "Currency commands change the default for all future expenses unless explicitly overridden.",
];

fn canonical_topic(topic: &str) -> &str {
    match topic {
        "account" | "accounts" | "cash" => "accounts",
        "card" | "cards" | "credit card" | "credit cards" => "cards",
        "transaction" | "transactions" | "expense" | "expenses" => "transactions",
        "category" | "categories" => "categories",
        "loan" | "loans" => "loans",
        "summary" | "summaries" | "report" | "reports" => "summary",
        "setting" | "settings" | "currency" | "currencies" | "default currency" => "settings",
        other => other,
    }
}

/// Help text for a topic; unknown topics (and no topic) fall back to the
/// general list. Input is already normalized to lowercase collapsed text.
pub(crate) fn text(topic: Option<&str>) -> String {
    let section = match topic.map(canonical_topic) {
        Some("accounts") => ACCOUNTS,
        Some("cards") => CARDS,
        Some("transactions") => TRANSACTIONS,
        Some("categories") => CATEGORIES,
        Some("loans") => LOANS,
        Some("summary") => SUMMARY,
        Some("settings") => SETTINGS,
        _ => GENERAL,
    };
    section.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_aliases_reach_their_section() {
        assert!(text(Some("loans")).starts_with("Loans help:"));
        assert!(text(Some("expenses")).starts_with("Transactions help:"));
        assert!(text(Some("credit card")).starts_with("Cards help:"));
        assert!(text(Some("default currency")).starts_with("Settings help:"));
    }

    #[test]
    fn unknown_topic_falls_back_to_general() {
        assert_eq!(text(Some("weather")), text(None));
        assert!(text(None).starts_with("Supported commands"));
    }
}
