use rowtag_core::{Error, Result};
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// Identifier or keyword, possibly schema qualified.
    Word(String),
    /// `:1`, `:2`, ...
    Positional(usize),
    /// `:NAME`
    Named(String),
    Symbol(char),
}

pub(crate) fn tokenize(sql: &str) -> Result<Vec<Token>> {
    fn word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_' || c == '.'
    }
    fn take_while(it: &mut Peekable<CharIndices>, f: impl Fn(char) -> bool) -> String {
        let mut result = String::new();
        while let Some((_, c)) = it.next_if(|(_, c)| f(*c)) {
            result.push(c);
        }
        result
    }
    let mut result = Vec::new();
    let mut it = sql.char_indices().peekable();
    while let Some(&(i, c)) = it.peek() {
        if c.is_whitespace() {
            it.next();
        } else if c == ':' {
            it.next();
            let name = take_while(&mut it, word_char);
            if name.is_empty() {
                return Err(Error::msg(format!(
                    "Expected a parameter name after `:` at offset {i} in `{sql}`"
                )));
            }
            result.push(match name.parse::<usize>() {
                Ok(0) => {
                    return Err(Error::msg(format!(
                        "Positional parameters start from 1, found `:0` in `{sql}`"
                    )));
                }
                Ok(n) => Token::Positional(n),
                Err(..) => Token::Named(name.to_uppercase()),
            });
        } else if word_char(c) {
            result.push(Token::Word(take_while(&mut it, word_char)));
        } else if matches!(c, '(' | ')' | ',' | '=' | '*') {
            it.next();
            result.push(Token::Symbol(c));
        } else {
            return Err(Error::msg(format!(
                "Unexpected character `{c}` at offset {i} in `{sql}`"
            )));
        }
    }
    Ok(result)
}

/// Reference to a statement input, the index is zero based over the input values.
pub(crate) type Input = usize;

/// Conjunction of `COLUMN = input` terms.
pub(crate) type Filter = Vec<(String, Input)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Insert {
        table: String,
        columns: Vec<String>,
        values: Vec<Input>,
        returning: Option<String>,
    },
    Select {
        table: String,
        columns: Vec<String>,
        filter: Filter,
    },
    Update {
        table: String,
        set: Vec<(String, Input)>,
        filter: Filter,
    },
    Delete {
        table: String,
        filter: Filter,
    },
}

impl Command {
    pub(crate) fn table(&self) -> &str {
        match self {
            Command::Insert { table, .. }
            | Command::Select { table, .. }
            | Command::Update { table, .. }
            | Command::Delete { table, .. } => table,
        }
    }
}

enum Placeholder {
    Positional(usize),
    Named(String),
}

struct Parser<'a> {
    sql: &'a str,
    tokens: Vec<Token>,
    position: usize,
    /// Input placeholders in order of appearance.
    placeholders: Vec<Placeholder>,
}

impl<'a> Parser<'a> {
    fn error(&self, expected: &str) -> Error {
        Error::msg(format!(
            "Expected {expected} but found {} in `{}`",
            self.tokens
                .get(self.position)
                .map_or("the end of the statement".to_string(), |v| format!("{v:?}")),
            self.sql,
        ))
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(
            self.tokens.get(self.position),
            Some(Token::Word(v)) if v.eq_ignore_ascii_case(keyword)
        )
    }

    fn keyword(&mut self, keyword: &str) -> Result<()> {
        if self.peek_keyword(keyword) {
            self.position += 1;
            Ok(())
        } else {
            Err(self.error(&format!("`{keyword}`")))
        }
    }

    fn symbol(&mut self, symbol: char) -> Result<()> {
        if self.tokens.get(self.position) == Some(&Token::Symbol(symbol)) {
            self.position += 1;
            Ok(())
        } else {
            Err(self.error(&format!("`{symbol}`")))
        }
    }

    fn peek_symbol(&self, symbol: char) -> bool {
        self.tokens.get(self.position) == Some(&Token::Symbol(symbol))
    }

    fn identifier(&mut self) -> Result<String> {
        match self.tokens.get(self.position) {
            Some(Token::Word(v)) => {
                self.position += 1;
                Ok(v.to_uppercase())
            }
            _ => Err(self.error("an identifier")),
        }
    }

    fn identifier_list(&mut self) -> Result<Vec<String>> {
        let mut result = vec![self.identifier()?];
        while self.peek_symbol(',') {
            self.position += 1;
            result.push(self.identifier()?);
        }
        Ok(result)
    }

    fn placeholder(&mut self) -> Result<Input> {
        let placeholder = match self.tokens.get(self.position) {
            Some(Token::Positional(n)) => Placeholder::Positional(*n),
            Some(Token::Named(n)) => Placeholder::Named(n.clone()),
            _ => return Err(self.error("a parameter")),
        };
        self.position += 1;
        self.placeholders.push(placeholder);
        Ok(self.placeholders.len() - 1)
    }

    fn assignment(&mut self) -> Result<(String, Input)> {
        let column = self.identifier()?;
        self.symbol('=')?;
        Ok((column, self.placeholder()?))
    }

    fn filter(&mut self) -> Result<Filter> {
        let mut result = Filter::new();
        if !self.peek_keyword("WHERE") {
            return Ok(result);
        }
        self.position += 1;
        result.push(self.assignment()?);
        while self.peek_keyword("AND") {
            self.position += 1;
            result.push(self.assignment()?);
        }
        Ok(result)
    }

    fn end(&self) -> Result<()> {
        if self.position == self.tokens.len() {
            Ok(())
        } else {
            Err(self.error("the end of the statement"))
        }
    }

    fn command(&mut self) -> Result<Command> {
        let command = if self.peek_keyword("INSERT") {
            self.position += 1;
            self.keyword("INTO")?;
            let table = self.identifier()?;
            self.symbol('(')?;
            let columns = self.identifier_list()?;
            self.symbol(')')?;
            self.keyword("VALUES")?;
            self.symbol('(')?;
            let mut values = vec![self.placeholder()?];
            while self.peek_symbol(',') {
                self.position += 1;
                values.push(self.placeholder()?);
            }
            self.symbol(')')?;
            if columns.len() != values.len() {
                return Err(Error::msg(format!(
                    "Insert into `{table}` has {} columns but {} values",
                    columns.len(),
                    values.len()
                )));
            }
            let returning = if self.peek_keyword("RETURNING") {
                self.position += 1;
                let column = self.identifier()?;
                self.keyword("INTO")?;
                match self.tokens.get(self.position) {
                    Some(Token::Named(..)) => self.position += 1,
                    _ => return Err(self.error("an output parameter")),
                }
                Some(column)
            } else {
                None
            };
            Command::Insert {
                table,
                columns,
                values,
                returning,
            }
        } else if self.peek_keyword("SELECT") {
            self.position += 1;
            let columns = self.identifier_list()?;
            self.keyword("FROM")?;
            let table = self.identifier()?;
            let filter = self.filter()?;
            Command::Select {
                table,
                columns,
                filter,
            }
        } else if self.peek_keyword("UPDATE") {
            self.position += 1;
            let table = self.identifier()?;
            self.keyword("SET")?;
            let mut set = vec![self.assignment()?];
            while self.peek_symbol(',') {
                self.position += 1;
                set.push(self.assignment()?);
            }
            let filter = self.filter()?;
            Command::Update { table, set, filter }
        } else if self.peek_keyword("DELETE") {
            self.position += 1;
            self.keyword("FROM")?;
            let table = self.identifier()?;
            let filter = self.filter()?;
            Command::Delete { table, filter }
        } else {
            return Err(self.error("`INSERT`, `SELECT`, `UPDATE` or `DELETE`"));
        };
        self.end()?;
        Ok(command)
    }

    /// Map every placeholder to the index of the input it reads: positional
    /// ones read their own number, named ones read the inputs following the
    /// highest positional in order of first appearance. Repeating a name
    /// reads the same input again.
    fn resolve(&self) -> Vec<usize> {
        let positional = self
            .placeholders
            .iter()
            .filter_map(|v| match v {
                Placeholder::Positional(n) => Some(*n),
                Placeholder::Named(..) => None,
            })
            .max()
            .unwrap_or_default();
        let mut names: Vec<&str> = Vec::new();
        self.placeholders
            .iter()
            .map(|v| match v {
                Placeholder::Positional(n) => n - 1,
                Placeholder::Named(name) => {
                    let slot = names
                        .iter()
                        .position(|v| *v == name.as_str())
                        .unwrap_or_else(|| {
                            names.push(name);
                            names.len() - 1
                        });
                    positional + slot
                }
            })
            .collect()
    }
}

pub(crate) fn parse(sql: &str) -> Result<Command> {
    let mut parser = Parser {
        sql,
        tokens: tokenize(sql)?,
        position: 0,
        placeholders: Vec::new(),
    };
    let command = parser.command()?;
    let inputs = parser.resolve();
    let map = |v: Input| inputs[v];
    let map_pairs = |pairs: Vec<(String, Input)>| {
        pairs
            .into_iter()
            .map(|(k, v)| (k, map(v)))
            .collect::<Vec<_>>()
    };
    Ok(match command {
        Command::Insert {
            table,
            columns,
            values,
            returning,
        } => Command::Insert {
            table,
            columns,
            values: values.into_iter().map(map).collect(),
            returning,
        },
        Command::Select {
            table,
            columns,
            filter,
        } => Command::Select {
            table,
            columns,
            filter: map_pairs(filter),
        },
        Command::Update { table, set, filter } => Command::Update {
            table,
            set: map_pairs(set),
            filter: map_pairs(filter),
        },
        Command::Delete { table, filter } => Command::Delete {
            table,
            filter: map_pairs(filter),
        },
    })
}
