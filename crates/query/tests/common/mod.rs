//! Mock index, engine and operators shared by the integration tests.

#![allow(dead_code)]

use sift_core::{Error, Result, ResultTable, Row, TermId, Value};
use sift_query::{evaluate, ContextConfig, ExecutionContext, KeyWriter, Operator, SubtreeKey};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Tiny triple store standing in for the index.
pub struct TripleIndex {
    triples: Vec<(TermId, TermId, TermId)>,
}

impl TripleIndex {
    pub fn sample() -> Self {
        // 1 knows 2, 2 knows 3, 3 knows 1, 1 age 30
        Self {
            triples: vec![(1, 10, 2), (2, 10, 3), (3, 10, 1), (1, 20, 30)],
        }
    }

    pub fn scan(&self, predicate: TermId) -> Result<Vec<(TermId, TermId)>> {
        let pairs: Vec<_> = self
            .triples
            .iter()
            .filter(|(_, p, _)| *p == predicate)
            .map(|(s, _, o)| (*s, *o))
            .collect();
        if pairs.is_empty() {
            return Err(Error::invalid_operation(format!("unknown predicate #{}", predicate)));
        }
        Ok(pairs)
    }
}

/// Engine stand-in that counts how many scans it was asked to run.
#[derive(Default)]
pub struct CountingEngine {
    scans: AtomicUsize,
}

impl CountingEngine {
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

pub type Ctx<'a> = ExecutionContext<'a, TripleIndex, CountingEngine>;
pub type BoxedOp = Box<dyn Operator<TripleIndex, CountingEngine>>;

pub struct Scan {
    pub subject: &'static str,
    pub predicate: TermId,
    pub object: &'static str,
}

impl SubtreeKey for Scan {
    fn write_key(&self, w: &mut KeyWriter) {
        w.begin("SCAN")
            .field(self.subject)
            .display(self.predicate)
            .field(self.object)
            .end();
    }
}

impl Operator<TripleIndex, CountingEngine> for Scan {
    fn compute(&self, ctx: &mut Ctx<'_>) -> Result<ResultTable> {
        ctx.engine().scans.fetch_add(1, Ordering::SeqCst);
        let rows = ctx
            .index()
            .scan(self.predicate)?
            .into_iter()
            .map(|(s, o)| Row::new(vec![Value::Term(s), Value::Term(o)]))
            .collect();
        ResultTable::computed(vec![self.subject.into(), self.object.into()], rows)
    }
}

/// Equi-join of two subtrees on one shared variable.
pub struct Join {
    pub left: BoxedOp,
    pub right: BoxedOp,
    pub on: &'static str,
}

impl SubtreeKey for Join {
    fn write_key(&self, w: &mut KeyWriter) {
        w.begin("JOIN")
            .child(&*self.left)
            .child(&*self.right)
            .field(self.on)
            .end();
    }
}

impl Operator<TripleIndex, CountingEngine> for Join {
    fn compute(&self, ctx: &mut Ctx<'_>) -> Result<ResultTable> {
        let left = evaluate(&*self.left, ctx)?;
        let right = evaluate(&*self.right, ctx)?;
        let missing = || Error::invalid_operation(format!("join variable {} not bound", self.on));
        let l = left.column_index(self.on).ok_or_else(missing)?;
        let r = right.column_index(self.on).ok_or_else(missing)?;

        let mut columns = left.columns().to_vec();
        columns.extend(
            right
                .columns()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != r)
                .map(|(_, c)| c.clone()),
        );

        let mut out = ResultTable::new(columns);
        for lrow in left.rows() {
            for rrow in right.rows() {
                if lrow.get(l) == rrow.get(r) {
                    let mut row = lrow.clone();
                    for (i, v) in rrow.values().iter().enumerate() {
                        if i != r {
                            row.push(v.clone());
                        }
                    }
                    out.push_row(row)?;
                }
            }
        }
        Ok(out)
    }
}

pub fn knows(subject: &'static str, object: &'static str) -> BoxedOp {
    Box::new(Scan {
        subject,
        predicate: 10,
        object,
    })
}

/// ?a knows ?b . ?b knows ?c
pub fn friends_of_friends() -> Join {
    Join {
        left: knows("?a", "?b"),
        right: knows("?b", "?c"),
        on: "?b",
    }
}

pub fn context<'a>(index: &'a TripleIndex, engine: &'a CountingEngine, capacity: usize) -> Ctx<'a> {
    let config = ContextConfig::new().with_subtree_cache_capacity(capacity);
    ExecutionContext::with_config(index, engine, &config).unwrap()
}
