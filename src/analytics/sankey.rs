//! Three-column money-flow layout: income sources, a single "Cash Flow"
//! allocation node, and expense categories.

use crate::domain::Transaction;

pub const NODE_WIDTH: f64 = 40.0;
pub const COLUMN_SPACING: f64 = 250.0;
pub const NODE_SPACING: f64 = 20.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 600.0;
const LEFT_MARGIN: f64 = 50.0;
const ALLOCATION_HEIGHT_RATIO: f64 = 0.8;

pub const ALLOCATION_NODE: &str = "Cash Flow";
const OTHER_INCOME: &str = "Other Income";
const OTHER_EXPENSE: &str = "Other Expense";

#[derive(Debug, Clone, PartialEq)]
pub struct SankeyNode {
    pub name: String,
    pub total_amount: f64,
    /// 0 = income, 1 = allocation, 2 = expense.
    pub column: usize,
    pub y: f64,
    pub height: f64,
}

/// A band between two nodes, referenced by their index in [`SankeyDiagram::nodes`].
#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub amount: f64,
    pub source_y: f64,
    pub target_y: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SankeyDiagram {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

impl SankeyDiagram {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn column(&self, column: usize) -> impl Iterator<Item = &SankeyNode> {
        self.nodes.iter().filter(move |node| node.column == column)
    }
}

pub struct SankeyService;

impl SankeyService {
    pub fn generate<'a, I>(transactions: I, canvas_height: f64) -> SankeyDiagram
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut income: Vec<(String, f64)> = Vec::new();
        let mut expense: Vec<(String, f64)> = Vec::new();
        for txn in transactions {
            let (groups, fallback) = if txn.is_income() {
                (&mut income, OTHER_INCOME)
            } else {
                (&mut expense, OTHER_EXPENSE)
            };
            let key = if txn.category.trim().is_empty() {
                fallback
            } else {
                txn.category.as_str()
            };
            match groups.iter_mut().find(|(name, _)| name == key) {
                Some((_, total)) => *total += txn.amount,
                None => groups.push((key.to_string(), txn.amount)),
            }
        }
        // Stable sort keeps first-seen order between equal totals.
        income.sort_by(|a, b| b.1.total_cmp(&a.1));
        expense.sort_by(|a, b| b.1.total_cmp(&a.1));

        let total_income: f64 = income.iter().map(|(_, amount)| amount).sum();
        let total_expense: f64 = expense.iter().map(|(_, amount)| amount).sum();
        let total_flow = total_income.max(total_expense);
        if total_flow <= 0.0 {
            return SankeyDiagram::default();
        }

        let mut diagram = SankeyDiagram::default();
        Self::push_column(&mut diagram, &income, 0, total_flow, canvas_height);
        let allocation = diagram.nodes.len();
        diagram.nodes.push(SankeyNode {
            name: ALLOCATION_NODE.to_string(),
            total_amount: total_flow,
            column: 1,
            y: 0.0,
            height: canvas_height * ALLOCATION_HEIGHT_RATIO,
        });
        Self::push_column(&mut diagram, &expense, 2, total_flow, canvas_height);

        let mut offset = 0.0;
        for index in 0..allocation {
            let node = &diagram.nodes[index];
            diagram.links.push(SankeyLink {
                source: index,
                target: allocation,
                amount: node.total_amount,
                source_y: 0.0,
                target_y: offset,
                width: node.height,
            });
            offset += node.height;
        }

        let mut offset = 0.0;
        for index in allocation + 1..diagram.nodes.len() {
            let node = &diagram.nodes[index];
            diagram.links.push(SankeyLink {
                source: allocation,
                target: index,
                amount: node.total_amount,
                source_y: offset,
                target_y: 0.0,
                width: node.height,
            });
            offset += node.height;
        }
        diagram
    }

    fn push_column(
        diagram: &mut SankeyDiagram,
        groups: &[(String, f64)],
        column: usize,
        total_flow: f64,
        canvas_height: f64,
    ) {
        let usable = canvas_height - NODE_SPACING * groups.len() as f64;
        let mut y = 0.0;
        for (name, amount) in groups {
            let height = amount / total_flow * usable;
            diagram.nodes.push(SankeyNode {
                name: name.clone(),
                total_amount: *amount,
                column,
                y,
                height,
            });
            y += height + NODE_SPACING;
        }
    }

    pub fn node_x(column: usize) -> f64 {
        column as f64 * COLUMN_SPACING + LEFT_MARGIN
    }

    pub fn node_width() -> f64 {
        NODE_WIDTH
    }
}
