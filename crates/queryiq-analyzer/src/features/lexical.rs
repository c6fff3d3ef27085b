//! Lexical SQL analysis
//!
//! Counts query constructs from real tokens rather than substrings, so a
//! column named `selected` or a string literal containing `select * from`
//! never inflates the counts. Tokenization uses the generic SQL dialect;
//! if it fails outright the counts degrade to zero and the caller keeps
//! going on query length alone.

use serde::{Deserialize, Serialize};
use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, Tokenizer};
use tracing::warn;

/// Token-derived counts for one SQL statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalFeatures {
    /// Number of SELECT keywords (outer statement included)
    pub num_select: u32,
    /// Number of JOIN keywords (any join flavor)
    pub num_join: u32,
    /// Number of SELECT keywords inside parenthesized expressions
    pub num_subqueries: u32,
    /// Number of GROUP BY clauses
    pub num_group_by: u32,
    /// Number of ORDER BY clauses
    pub num_order_by: u32,
    /// Number of DISTINCT keywords
    pub num_distinct: u32,
    /// Number of LIMIT keywords
    pub num_limit: u32,
    /// Query text length in characters
    pub query_length: u32,
    /// True when a SELECT is immediately followed by `*`
    pub has_select_star: bool,
    /// True when the statement has a WHERE clause
    pub has_where_clause: bool,
}

impl LexicalFeatures {
    /// Scans the query text. Never fails: a tokenizer error is logged and
    /// yields zeroed counts with only `query_length` populated.
    pub fn scan(query_text: &str) -> Self {
        let mut features = Self {
            query_length: query_text.chars().count() as u32,
            ..Self::default()
        };

        let dialect = GenericDialect {};
        let tokens = match Tokenizer::new(&dialect, query_text).tokenize() {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(error = %err, "failed to tokenize query text, lexical counts degraded");
                return features;
            }
        };
        let tokens: Vec<&Token> = tokens
            .iter()
            .filter(|t| !matches!(t, Token::Whitespace(_)))
            .collect();

        let mut paren_depth = 0u32;
        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::LParen => paren_depth += 1,
                Token::RParen => paren_depth = paren_depth.saturating_sub(1),
                Token::Word(word) => match word.keyword {
                    Keyword::SELECT => {
                        features.num_select += 1;
                        if paren_depth > 0 {
                            features.num_subqueries += 1;
                        }
                        if matches!(tokens.get(i + 1), Some(Token::Mul)) {
                            features.has_select_star = true;
                        }
                    }
                    Keyword::JOIN => features.num_join += 1,
                    Keyword::GROUP if keyword_at(&tokens, i + 1, Keyword::BY) => {
                        features.num_group_by += 1;
                    }
                    Keyword::ORDER if keyword_at(&tokens, i + 1, Keyword::BY) => {
                        features.num_order_by += 1;
                    }
                    Keyword::DISTINCT => features.num_distinct += 1,
                    Keyword::LIMIT => features.num_limit += 1,
                    Keyword::WHERE => features.has_where_clause = true,
                    _ => {}
                },
                _ => {}
            }
        }

        features
    }
}

fn keyword_at(tokens: &[&Token], index: usize, keyword: Keyword) -> bool {
    matches!(tokens.get(index), Some(Token::Word(w)) if w.keyword == keyword)
}
