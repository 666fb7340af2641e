use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::apriori::{generate_rules, mine, TransactionSet};
use crate::config::MiningConfig;
use crate::error::MiningError;

impl From<MiningError> for PyErr {
    fn from(err: MiningError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Item ids are the matrix column indices.
fn transactions_from_matrix(transactions: PyReadonlyArray2<'_, i32>) -> PyResult<TransactionSet> {
    let view = transactions.as_array();
    let labels: Vec<String> = (0..view.ncols()).map(|col| col.to_string()).collect();
    Ok(TransactionSet::from_matrix(view, &labels)?)
}

/// One `(itemsets, supports)` pair per non-empty level.
#[pyfunction]
#[pyo3(signature = (transactions, min_support, max_len=None))]
fn apriori<'py>(
    py: Python<'py>,
    transactions: PyReadonlyArray2<'py, i32>,
    min_support: f64,
    max_len: Option<usize>,
) -> PyResult<Vec<(Bound<'py, PyArray2<usize>>, Bound<'py, PyArray1<usize>>)>> {
    let tx = transactions_from_matrix(transactions)?;
    let mut config = MiningConfig::default().with_min_support_ratio(min_support);
    if let Some(max_len) = max_len {
        config = config.with_max_len(max_len);
    }

    let frequent = py.allow_threads(|| mine(&tx, &config))?;

    let mut result = Vec::new();
    for level in frequent.levels() {
        if level.is_empty() {
            continue;
        }

        let itemset_size = level.itemset_size;
        let num_itemsets = level.len();
        let mut data = vec![0usize; num_itemsets * itemset_size];
        let mut supports = Vec::with_capacity(num_itemsets);

        for (i, (itemset, count)) in level.iter().enumerate() {
            data[i * itemset_size..(i + 1) * itemset_size].copy_from_slice(itemset);
            supports.push(count);
        }

        let array = Array2::from_shape_vec((num_itemsets, itemset_size), data)
            .map_err(|_| PyValueError::new_err("Failed to create array"))?;

        result.push((array.into_pyarray(py), supports.into_pyarray(py)));
    }

    Ok(result)
}

/// Rules as `(antecedent, consequent, support_count, confidence, lift)`, ranked by lift.
#[pyfunction]
#[pyo3(signature = (transactions, min_support, min_confidence=0.5))]
fn association_rules(
    py: Python<'_>,
    transactions: PyReadonlyArray2<'_, i32>,
    min_support: f64,
    min_confidence: f64,
) -> PyResult<Vec<(Vec<usize>, Vec<usize>, usize, f64, f64)>> {
    let tx = transactions_from_matrix(transactions)?;
    let config = MiningConfig {
        min_confidence,
        ..MiningConfig::default().with_min_support_ratio(min_support)
    };
    config.validate()?;

    let rules = py.allow_threads(|| {
        mine(&tx, &config).map(|frequent| generate_rules(&frequent, &tx, config.min_confidence))
    })?;

    Ok(rules
        .into_iter()
        .map(|rule| {
            (
                rule.antecedent,
                rule.consequent,
                rule.support_count,
                rule.confidence,
                rule.lift,
            )
        })
        .collect())
}

#[pymodule]
fn cooccur(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(apriori, m)?)?;
    m.add_function(wrap_pyfunction!(association_rules, m)?)?;
    Ok(())
}
