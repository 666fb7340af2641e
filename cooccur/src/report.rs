use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::apriori::{top_by_lift, FrequentItemsets, Rule, TransactionSet};
use crate::error::Result;

pub const NO_ITEMSETS: &str = "No frequent itemsets found.";
pub const NO_RULES: &str = "No association rules found with these thresholds.";

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemsetRow {
    pub members: Vec<String>,
    pub count: usize,
    pub support: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleRow {
    pub antecedent: Vec<String>,
    pub consequent: Vec<String>,
    pub support_count: usize,
    pub confidence: f64,
    /// Serialized as `null` when infinite.
    pub lift: f64,
}

/// Everything a presentation layer needs, with item ids resolved to labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiningReport {
    pub num_transactions: usize,
    pub min_support_count: usize,
    pub itemsets: Vec<ItemsetRow>,
    pub counts_by_size: BTreeMap<usize, usize>,
    pub rules: Vec<RuleRow>,
    pub top_rules: Vec<RuleRow>,
}

impl MiningReport {
    pub fn build(
        transactions: &TransactionSet,
        frequent: &FrequentItemsets,
        rules: &[Rule],
        top_k: usize,
    ) -> Self {
        let items = transactions.items();

        let itemsets = frequent
            .sorted()
            .into_iter()
            .map(|(itemset, count)| ItemsetRow {
                members: items.resolve(itemset),
                count,
                support: frequent.support(count),
            })
            .collect();

        let to_row = |rule: &Rule| RuleRow {
            antecedent: items.resolve(&rule.antecedent),
            consequent: items.resolve(&rule.consequent),
            support_count: rule.support_count,
            confidence: rule.confidence,
            lift: rule.lift,
        };

        Self {
            num_transactions: frequent.num_transactions(),
            min_support_count: frequent.min_count(),
            itemsets,
            counts_by_size: frequent.counts_by_size(),
            rules: rules.iter().map(to_row).collect(),
            top_rules: top_by_lift(rules, top_k).iter().map(to_row).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Text chart of the number of frequent itemsets per size.
    pub fn size_chart(&self) -> String {
        let bars: Vec<(String, f64)> = self
            .counts_by_size
            .iter()
            .map(|(&size, &count)| (format!("k={}", size), count as f64))
            .collect();
        render_bars(&bars, |value| format!("{}", value))
    }

    /// Text chart of the top rules by lift.
    pub fn top_rules_chart(&self) -> String {
        let bars: Vec<(String, f64)> = self
            .top_rules
            .iter()
            .map(|rule| {
                (
                    format!("{} -> {}", braces(&rule.antecedent), braces(&rule.consequent)),
                    rule.lift,
                )
            })
            .collect();
        render_bars(&bars, |value| format!("{:.3}", value))
    }
}

impl fmt::Display for MiningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frequent Itemsets (itemset : count, support):")?;
        if self.itemsets.is_empty() {
            writeln!(f, "{}", NO_ITEMSETS)?;
        }
        for row in &self.itemsets {
            writeln!(
                f,
                "{} : {}, {}/{} = {:.3}",
                braces(&row.members),
                row.count,
                row.count,
                self.num_transactions,
                row.support
            )?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Association Rules (antecedent -> consequent) : support_count, confidence, lift"
        )?;
        if self.rules.is_empty() {
            writeln!(f, "{}", NO_RULES)?;
        }
        for rule in &self.rules {
            writeln!(
                f,
                "{} -> {} : support={}, confidence={:.3}, lift={:.3}",
                braces(&rule.antecedent),
                braces(&rule.consequent),
                rule.support_count,
                rule.confidence,
                rule.lift
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Number of frequent itemsets by size:")?;
        if self.counts_by_size.is_empty() {
            writeln!(f, "{}", NO_ITEMSETS)?;
        } else {
            write!(f, "{}", self.size_chart())?;
        }

        writeln!(f)?;
        writeln!(f, "Top {} rules by lift:", self.top_rules.len())?;
        if self.top_rules.is_empty() {
            writeln!(f, "{}", NO_RULES)?;
        } else {
            write!(f, "{}", self.top_rules_chart())?;
        }
        Ok(())
    }
}

fn braces(members: &[String]) -> String {
    format!("{{{}}}", members.join(", "))
}

fn render_bars(bars: &[(String, f64)], value_label: impl Fn(f64) -> String) -> String {
    let label_width = bars.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let max_finite = bars
        .iter()
        .map(|&(_, value)| value)
        .filter(|value| value.is_finite())
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    for (label, value) in bars {
        let width = if value.is_infinite() {
            BAR_WIDTH
        } else if max_finite > 0.0 {
            ((value / max_finite) * BAR_WIDTH as f64).round().max(1.0) as usize
        } else {
            0
        };
        out.push_str(&format!(
            "  {:<label_width$} | {} {}\n",
            label,
            "#".repeat(width),
            value_label(*value),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analyze, MiningConfig};

    fn basket() -> TransactionSet {
        TransactionSet::from_tokens(vec![
            vec!["A", "B"],
            vec!["A", "B", "C"],
            vec!["A"],
            vec!["B", "C"],
        ])
        .unwrap()
    }

    #[test]
    fn renders_itemsets_and_rules() {
        let report = analyze(&basket(), &MiningConfig::new(2, 0.5)).unwrap();
        let text = report.to_string();

        assert!(text.contains("{A} : 3, 3/4 = 0.750"));
        assert!(text.contains("{A, B} : 2, 2/4 = 0.500"));
        assert!(text.contains("{C} -> {B} : support=2, confidence=1.000, lift=1.333"));
        assert!(text.contains("{A} -> {B} : support=2, confidence=0.667, lift=0.889"));
        assert!(!text.contains(NO_RULES));
    }

    #[test]
    fn reports_counts_by_size_and_top_rules() {
        let report = analyze(&basket(), &MiningConfig::new(2, 0.5).with_top_k(2)).unwrap();

        assert_eq!(report.counts_by_size.get(&1), Some(&3));
        assert_eq!(report.counts_by_size.get(&2), Some(&2));
        assert_eq!(report.rules.len(), 4);
        assert_eq!(report.top_rules.len(), 2);
        assert_eq!(report.top_rules[0], report.rules[0]);
        assert!(report.size_chart().contains("k=1"));
    }

    #[test]
    fn empty_results_produce_messages() {
        let report = analyze(&basket(), &MiningConfig::new(10, 0.5)).unwrap();
        let text = report.to_string();

        assert!(report.itemsets.is_empty());
        assert!(text.contains(NO_ITEMSETS));
        assert!(text.contains(NO_RULES));
    }

    #[test]
    fn json_report_serializes_infinite_lift_as_null() {
        let mut report = analyze(&basket(), &MiningConfig::new(2, 0.5)).unwrap();
        report.rules[0].lift = f64::INFINITY;

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert!(value["rules"][0]["lift"].is_null());
        assert_eq!(value["itemsets"][0]["members"][0], "A");
        assert_eq!(value["num_transactions"], 4);
    }

    #[test]
    fn infinite_lift_gets_full_bar() {
        let bars = vec![("a".to_string(), f64::INFINITY), ("b".to_string(), 2.0)];
        let chart = render_bars(&bars, |v| format!("{:.3}", v));

        assert!(chart.contains(&format!("{} inf", "#".repeat(BAR_WIDTH))));
        assert!(chart.contains("2.000"));
    }
}
