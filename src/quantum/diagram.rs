//! Text diagrams of circuits
//!
//! One horizontal wire per qubit in ascending qubit order, one column per
//! moment. Multi-qubit operations are joined by a vertical line.

use std::collections::HashMap;

use crate::quantum::circuit::{Circuit, Operation};
use crate::quantum::qubit::Qubit;

const WIRE: char = '─';
const LINK: &str = "│";
const CROSSING: &str = "┼";

fn pad(cell: &mut String, symbol: &str, width: usize, fill: char) {
    cell.push_str(symbol);
    for _ in symbol.chars().count()..width {
        cell.push(fill);
    }
}

/// The rows spanned by `op`, from its topmost to its bottommost wire
fn row_span(op: &Operation, row_of: &HashMap<&Qubit, usize>) -> (usize, usize) {
    let rows = op.qubits().iter().map(|q| row_of[q]);
    let lo = rows.clone().min().unwrap_or(0);
    let hi = rows.max().unwrap_or(0);
    (lo, hi)
}

/// Splits a moment into drawing columns whose operations have disjoint row spans
///
/// Operations in one moment never share a qubit, but a vertical link may still
/// pass over another operation's wire. Those operations go in separate columns.
fn split_overlapping(
    moment: &[usize],
    operations: &[&Operation],
    row_of: &HashMap<&Qubit, usize>
) -> Vec<Vec<usize>> {
    let mut columns: Vec<(Vec<usize>, Vec<(usize, usize)>)> = Vec::new();

    for &index in moment {
        let (lo, hi) = row_span(operations[index], row_of);
        let free = columns
            .iter()
            .position(|(_, spans)| spans.iter().all(|&(a, b)| hi < a || b < lo));
        match free {
            Some(col) => {
                columns[col].0.push(index);
                columns[col].1.push((lo, hi));
            }
            None => columns.push((vec![index], vec![(lo, hi)])),
        }
    }

    columns.into_iter().map(|(ops, _)| ops).collect()
}

/// Render `circuit` as a text diagram; an empty circuit renders as ""
pub fn render(circuit: &Circuit) -> String {
    let qubits: Vec<Qubit> = circuit.all_qubits().into_iter().collect();
    if qubits.is_empty() {
        return String::new();
    }

    let row_of: HashMap<&Qubit, usize> = qubits.iter().enumerate().map(|(row, q)| (q, row)).collect();
    let labels: Vec<String> = qubits.iter().map(|q| format!("{}: ", q)).collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let n = qubits.len();
    let mut wires: Vec<String> = labels
        .iter()
        .map(|l| {
            let mut s = String::new();
            pad(&mut s, l, label_width, ' ');
            s
        })
        .collect();
    let mut gaps: Vec<String> = vec![" ".repeat(label_width); n - 1];

    let operations: Vec<&Operation> = circuit.all_operations().collect();
    let columns = circuit
        .moments()
        .into_iter()
        .flat_map(|moment| split_overlapping(&moment, &operations, &row_of));

    for column in columns {
        let mut cells: Vec<Option<String>> = vec![None; n];
        let mut crossed = vec![false; n];
        let mut linked = vec![false; n - 1];

        for &index in &column {
            let op = operations[index];
            let rows: Vec<usize> = op.qubits().iter().map(|q| row_of[q]).collect();
            for (&row, symbol) in rows.iter().zip(op.wire_symbols()) {
                cells[row] = Some(symbol);
            }

            if let (Some(&lo), Some(&hi)) = (rows.iter().min(), rows.iter().max()) {
                for gap in lo..hi {
                    linked[gap] = true;
                }
                for row in lo + 1..hi {
                    if !rows.contains(&row) {
                        crossed[row] = true;
                    }
                }
            }
        }

        let width = cells
            .iter()
            .flatten()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(1);

        for (row, wire) in wires.iter_mut().enumerate() {
            let symbol = match &cells[row] {
                Some(symbol) => symbol.clone(),
                None if crossed[row] => CROSSING.to_string(),
                None => WIRE.to_string(),
            };
            wire.push_str("───");
            pad(wire, &symbol, width, WIRE);
        }
        for (gap, line) in gaps.iter_mut().enumerate() {
            line.push_str("   ");
            pad(line, if linked[gap] { LINK } else { " " }, width, ' ');
        }
    }

    let mut lines = Vec::with_capacity(2 * n - 1);
    for (row, wire) in wires.iter_mut().enumerate() {
        wire.push_str("───");
        lines.push(wire.trim_end().to_string());
        if let Some(gap) = gaps.get(row) {
            lines.push(gap.trim_end().to_string());
        }
    }
    lines.join("\n")
}
