//! Raw record parsing and relation canonicalisation

use crate::graph::{CanonicalRelation, NodeType, Relation};

/// Raw relation that keeps a fixed name when relations are simplified
pub const METABOLITE_RELATION: &str = "HAS_METABOLITE";

/// Simplified label for [`METABOLITE_RELATION`]
const METABOLITE_SIMPLIFIED: &str = "protein_metabolite";

/// One parsed input line, borrowing from the line buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub head_type: &'a str,
    pub tail_type: &'a str,
    pub head_name: &'a str,
    pub relation: &'a str,
    pub tail_name: &'a str,
}

impl<'a> Record<'a> {
    /// Split a line on tabs. Surrounding whitespace is ignored and fields past the fifth
    /// are dropped. On failure returns the number of fields found.
    pub fn parse(line: &'a str) -> Result<Self, usize> {
        let mut fields = line.trim().split('\t');
        let mut next = || fields.next();
        match (next(), next(), next(), next(), next()) {
            (Some(head_type), Some(tail_type), Some(head_name), Some(relation), Some(tail_name)) => {
                Ok(Record {
                    head_type,
                    tail_type,
                    head_name,
                    relation,
                    tail_name,
                })
            }
            (a, b, c, d, _) => Err([a, b, c, d].iter().filter(|f| f.is_some()).count()),
        }
    }

    /// Canonical bucket key for this record
    pub fn canonical_relation(&self, simplify: bool) -> CanonicalRelation {
        let relation = if simplify {
            simplify_relation(self.head_type, self.relation, self.tail_type)
        } else {
            Relation::new(self.relation)
        };
        CanonicalRelation {
            source: NodeType::new(self.head_type),
            relation,
            target: NodeType::new(self.tail_type),
        }
    }
}

/// Collapse a raw relation to a coarse label: the metabolite relation keeps a fixed name,
/// everything else becomes `"{head_type}-{tail_type}"`.
pub fn simplify_relation(head_type: &str, relation: &str, tail_type: &str) -> Relation {
    if relation == METABOLITE_RELATION {
        Relation::new(METABOLITE_SIMPLIFIED)
    } else {
        Relation::new(format!("{}-{}", head_type, tail_type))
    }
}
