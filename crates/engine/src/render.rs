//! Reply rendering. One plain-text string per processed message; amounts
//! carry two fraction digits and an uppercase currency code, and any reply
//! for a mutation of a monetary entity ends with the resulting snapshot.

use std::fmt::Write as _;

use crate::{
    Money, accounts,
    accounts::AccountKind,
    cards, expenses,
    intent::{CardMetric, RelativePeriod},
    loans,
    loans::LoanStatus,
    ops::{CategoryTotal, CreditSnapshot, ListedExpense},
};

pub(crate) fn amount(value: Money, currency: &str) -> String {
    format!("{value} {}", currency.to_uppercase())
}

fn balance_line(account: &accounts::Model, currency: &str) -> String {
    let kind = AccountKind::parse(&account.kind).unwrap_or(AccountKind::Bank);
    format!(
        "Balance for {} {}: {}",
        account.name,
        kind.label(),
        amount(Money::new(account.balance_minor), currency)
    )
}

fn with_snapshot(mut text: String, account: Option<&accounts::Model>, currency: &str) -> String {
    if let Some(account) = account {
        let _ = write!(text, "\n{}", balance_line(account, currency));
    }
    text
}

pub(crate) fn expense_created(
    expense: &expenses::Model,
    category: &str,
    account: Option<&accounts::Model>,
    currency: &str,
) -> String {
    let text = format!(
        "Added expense {} for {category} on {}.",
        amount(Money::new(expense.amount_minor), &expense.currency),
        expense.date
    );
    with_snapshot(text, account, currency)
}

pub(crate) fn expense_updated(
    expense: &expenses::Model,
    account: Option<&accounts::Model>,
    currency: &str,
) -> String {
    with_snapshot(format!("Updated expense {}.", expense.id), account, currency)
}

pub(crate) fn expense_deleted(
    expense_id: i32,
    account: Option<&accounts::Model>,
    currency: &str,
) -> String {
    with_snapshot(format!("Deleted expense {expense_id}."), account, currency)
}

pub(crate) fn balance_summary(
    account: Option<&accounts::Model>,
    queried_name: &str,
    queried_kind: AccountKind,
    currency: &str,
) -> String {
    match account {
        Some(account) => balance_line(account, currency),
        None => format!(
            "No {} account named {queried_name} found.",
            queried_kind.label()
        ),
    }
}

pub(crate) fn credit_summary(snapshot: &CreditSnapshot, metric: CardMetric, currency: &str) -> String {
    let issuer = &snapshot.card.issuer;
    match metric {
        CardMetric::AvailableCredit => format!(
            "Available credit for {issuer}: {}",
            amount(snapshot.available, currency)
        ),
        CardMetric::Due => format!(
            "Due amount for {issuer}: {}",
            amount(snapshot.outstanding, currency)
        ),
        CardMetric::Outstanding => format!(
            "Outstanding for {issuer}: {}",
            amount(snapshot.outstanding, currency)
        ),
    }
}

pub(crate) fn month_summary(month_name: &str, year: i32, total: Money, currency: &str) -> String {
    format!(
        "Total expenses for {month_name} {year}: {}",
        amount(total, currency)
    )
}

pub(crate) fn relative_summary(period: RelativePeriod, total: Money, currency: &str) -> String {
    let label = match period {
        RelativePeriod::ThisMonth => "this month",
        RelativePeriod::LastMonth => "last month",
    };
    format!("Total expenses for {label}: {}", amount(total, currency))
}

pub(crate) fn account_list(accounts: &[accounts::Model], currency: &str) -> String {
    if accounts.is_empty() {
        return "No accounts found.".to_string();
    }
    let mut text = String::from("Accounts:");
    for account in accounts {
        let kind = AccountKind::parse(&account.kind).unwrap_or(AccountKind::Bank);
        let _ = write!(
            text,
            "\n- {} ({}): {}",
            account.name,
            kind.label(),
            amount(Money::new(account.balance_minor), currency)
        );
    }
    text
}

pub(crate) fn card_list(cards: &[cards::Model]) -> String {
    if cards.is_empty() {
        return "No cards found.".to_string();
    }
    let mut text = String::from("Cards:");
    for card in cards {
        let _ = write!(text, "\n- {}", card.display_name());
    }
    text
}

pub(crate) fn transaction_list(expenses: &[ListedExpense]) -> String {
    if expenses.is_empty() {
        return "No transactions found.".to_string();
    }
    let mut text = String::from("Recent transactions:");
    for listed in expenses {
        let expense = &listed.expense;
        let category = listed.category_name.as_deref().unwrap_or("uncategorized");
        let _ = write!(
            text,
            "\n- {} on {category} from {} on {}",
            amount(Money::new(expense.amount_minor), &expense.currency),
            listed.source_label,
            expense.date
        );
    }
    text
}

pub(crate) fn category_list(categories: &[CategoryTotal], currency: &str) -> String {
    if categories.is_empty() {
        return "No categories found.".to_string();
    }
    let mut text = String::from("Categories:");
    for category in categories {
        let _ = write!(
            text,
            "\n- {}: {}",
            category.name,
            amount(category.total, currency)
        );
        if category.alias_count > 0 {
            let _ = write!(text, ", {} alias(es)", category.alias_count);
        }
    }
    text
}

pub(crate) fn loan_list(loans: &[loans::Model], currency: &str) -> String {
    if loans.is_empty() {
        return "No loans found.".to_string();
    }
    let mut text = String::from("Loans:");
    for loan in loans {
        let status = if loan.status == LoanStatus::Paid.as_str() {
            "paid"
        } else {
            "active"
        };
        let _ = write!(
            text,
            "\n- {}: outstanding {} / {} ({status})",
            loan.name,
            Money::new(loan.outstanding_minor),
            amount(Money::new(loan.principal_minor), currency)
        );
        if !loan.description.is_empty() {
            let _ = write!(text, "\n  desc: {}", loan.description);
        }
    }
    text
}

pub(crate) fn loan_paid(loan: &loans::Model, paid: Money, currency: &str) -> String {
    let status = if loan.status == LoanStatus::Paid.as_str() {
        "Loan fully repaid."
    } else {
        "Partial payment recorded."
    };
    format!(
        "Paid {} towards {}. {status} Outstanding: {}.",
        amount(paid, currency),
        loan.name,
        amount(Money::new(loan.outstanding_minor), currency)
    )
}

pub(crate) fn loan_already_paid(loan: &loans::Model) -> String {
    format!("Loan {} is already fully paid.", loan.name)
}

pub(crate) fn loan_upserted(
    loan: &loans::Model,
    created: bool,
    reopened: bool,
    currency: &str,
) -> String {
    let verb = if created { "Added" } else { "Updated" };
    let mut text = format!(
        "{verb} loan {}. Outstanding: {}.",
        loan.name,
        amount(Money::new(loan.outstanding_minor), currency)
    );
    if reopened {
        text.push_str(" Loan reopened.");
    }
    text
}

pub(crate) fn account_upserted(
    account: &accounts::Model,
    created: bool,
    currency: &str,
) -> String {
    let kind = AccountKind::parse(&account.kind).unwrap_or(AccountKind::Bank);
    let verb = if created { "Added" } else { "Updated" };
    format!(
        "{verb} {} {}.\n{}",
        account.name,
        kind.label(),
        balance_line(account, currency)
    )
}

pub(crate) fn card_upserted(card: &cards::Model, created: bool, currency: &str) -> String {
    let verb = if created { "Added" } else { "Updated" };
    format!(
        "{verb} card {}. Limit: {}",
        card.display_name(),
        amount(Money::new(card.credit_limit_minor), currency)
    )
}

pub(crate) fn currency_set(code: &str, changed: bool) -> String {
    let code = code.to_uppercase();
    if changed {
        format!("Default currency set to {code}.")
    } else {
        format!("Default currency is already {code}.")
    }
}

pub(crate) fn duplicate() -> String {
    "Duplicate message ignored.".to_string()
}
