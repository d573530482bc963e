//! Aggregation of a month's transactions into totals, a thermometer status
//! and a budget-rule evaluation.

use crate::{
    month::MonthlySettings,
    transaction::{Transaction, TransactionType},
};

/// The totals of one month's transactions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthTotals {
    /// The sum of all income.
    pub income: f64,
    /// The sum of all fixed expenses.
    pub fixed_expenses: f64,
    /// The sum of all variable expenses.
    pub variable_expenses: f64,
    /// The sum of all investments.
    pub investments: f64,
}

impl MonthTotals {
    /// Sum a month's transactions into totals.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut totals = Self::default();

        for transaction in transactions {
            match transaction.transaction_type {
                TransactionType::Income => totals.income += transaction.amount,
                TransactionType::Expense if transaction.is_fixed => {
                    totals.fixed_expenses += transaction.amount
                }
                TransactionType::Expense => totals.variable_expenses += transaction.amount,
                TransactionType::Investment => totals.investments += transaction.amount,
            }
        }

        totals
    }

    /// All expenses, fixed and variable. Investments are not expenses.
    pub fn expenses(&self) -> f64 {
        self.fixed_expenses + self.variable_expenses
    }

    /// Everything that left the account: expenses plus investments.
    pub fn outflows(&self) -> f64 {
        self.expenses() + self.investments
    }

    /// The month's final balance: income minus all outflows.
    pub fn balance(&self) -> f64 {
        self.income - self.outflows()
    }

    /// The balance the thermometer is based on: income minus expenses.
    ///
    /// Investments are deliberately left out, money moved into investments
    /// does not put the month "in the red".
    pub fn cash_balance(&self) -> f64 {
        self.income - self.expenses()
    }
}

/// The qualitative status of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thermometer {
    /// More income than expenses.
    InTheBlack,
    /// Income and expenses cancel out exactly.
    BreakEven,
    /// More expenses than income.
    InTheRed,
}

impl Thermometer {
    /// Classify a month by its cash balance.
    pub fn from_totals(totals: &MonthTotals) -> Self {
        let balance = totals.cash_balance();

        if balance > 0.0 {
            Thermometer::InTheBlack
        } else if balance == 0.0 {
            Thermometer::BreakEven
        } else {
            Thermometer::InTheRed
        }
    }

    /// The label shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Thermometer::InTheBlack => "In the black",
            Thermometer::BreakEven => "Break even",
            Thermometer::InTheRed => "In the red",
        }
    }

    /// The emoji shown next to the label.
    pub fn emoji(&self) -> &'static str {
        match self {
            Thermometer::InTheBlack => "🟢",
            Thermometer::BreakEven => "🟡",
            Thermometer::InTheRed => "🔴",
        }
    }
}

/// How a budget bucket's actual spending compares to its ideal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// At or under the ideal amount.
    Within,
    /// Over the ideal amount by up to 10%.
    Near,
    /// More than 10% over the ideal amount.
    Over,
}

impl BudgetStatus {
    fn new(actual: f64, ideal: f64) -> Self {
        if actual <= ideal {
            BudgetStatus::Within
        } else if actual <= ideal * 1.1 {
            BudgetStatus::Near
        } else {
            BudgetStatus::Over
        }
    }
}

/// One row of the budget-rule summary.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetBucket {
    /// The name of the bucket.
    pub label: &'static str,
    /// The percentage of the base income budgeted for the bucket.
    pub percent: u8,
    /// The budgeted amount: base income times the percentage.
    pub ideal: f64,
    /// What actually happened this month.
    pub actual: f64,
    /// How the actual compares to the ideal.
    pub status: BudgetStatus,
}

/// Evaluate the month's budget rule.
///
/// The bucket actuals map onto the totals as follows: needs are the fixed
/// expenses, wants the variable expenses, investments the investments, and
/// savings whatever income is left after all outflows (never negative).
pub fn evaluate_budget(settings: &MonthlySettings, totals: &MonthTotals) -> [BudgetBucket; 4] {
    let bucket = |label: &'static str, percent: u8, actual: f64| {
        let ideal = settings.base_income * percent as f64 / 100.0;

        BudgetBucket {
            label,
            percent,
            ideal,
            actual,
            status: BudgetStatus::new(actual, ideal),
        }
    };

    let leftover = totals.balance().max(0.0);

    [
        bucket("Needs", settings.needs_percent, totals.fixed_expenses),
        bucket("Wants", settings.wants_percent, totals.variable_expenses),
        bucket("Savings", settings.savings_percent, leftover),
        bucket("Investment", settings.investment_percent, totals.investments),
    ]
}


#[cfg(test)]
mod budget_tests {
    use crate::{auth::UserID, month::MonthlySettings};

    use super::{BudgetStatus, MonthTotals, evaluate_budget};

    fn settings() -> MonthlySettings {
        MonthlySettings {
            id: 1,
            user_id: UserID::new(1),
            month: 6,
            year: 2025,
            base_income: 2000.0,
            needs_percent: 50,
            wants_percent: 20,
            savings_percent: 30,
            investment_percent: 0,
            notes: String::new(),
        }
    }

    #[test]
    fn ideals_are_percentages_of_base_income() {
        let buckets = evaluate_budget(&settings(), &MonthTotals::default());

        let ideals: Vec<_> = buckets.iter().map(|bucket| bucket.ideal).collect();
        assert_eq!(ideals, vec![1000.0, 400.0, 600.0, 0.0]);
    }

    #[test]
    fn bucket_within_budget() {
        let totals = MonthTotals {
            income: 2000.0,
            fixed_expenses: 900.0,
            ..Default::default()
        };

        let buckets = evaluate_budget(&settings(), &totals);

        assert_eq!(buckets[0].actual, 900.0);
        assert_eq!(buckets[0].status, BudgetStatus::Within);
    }

    #[test]
    fn bucket_slightly_over_budget_is_near() {
        // Up to 10% over the ideal still counts as near.
        let totals = MonthTotals {
            fixed_expenses: 1050.0,
            ..Default::default()
        };

        let buckets = evaluate_budget(&settings(), &totals);

        assert_eq!(buckets[0].status, BudgetStatus::Near);
    }

    #[test]
    fn bucket_far_over_budget_is_over() {
        let totals = MonthTotals {
            fixed_expenses: 1101.0,
            ..Default::default()
        };

        let buckets = evaluate_budget(&settings(), &totals);

        assert_eq!(buckets[0].status, BudgetStatus::Over);
    }

    #[test]
    fn savings_bucket_is_leftover_balance() {
        let totals = MonthTotals {
            income: 2000.0,
            fixed_expenses: 1000.0,
            variable_expenses: 400.0,
            investments: 100.0,
        };

        let buckets = evaluate_budget(&settings(), &totals);

        assert_eq!(buckets[2].label, "Savings");
        assert_eq!(buckets[2].actual, 500.0);
    }

    #[test]
    fn savings_bucket_is_zero_when_month_is_negative() {
        let totals = MonthTotals {
            income: 1000.0,
            fixed_expenses: 1500.0,
            ..Default::default()
        };

        let buckets = evaluate_budget(&settings(), &totals);

        assert_eq!(buckets[2].actual, 0.0);
    }
}
