use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::error::{PathError, PathErrorKind};
use crate::node::{Node, Selector};
use crate::tree::Tree;

/// What [`Tree::follow_path`] does when every step already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FollowMode {
    /// Return the existing node.
    #[default]
    Existing,
    /// Branch off a new sibling at the deepest line that allows one.
    CreateNew,
}

/// One step of a tag path: `NAME`, `NAME;N`, `NAME;TAG` or
/// `NAME;TAG;XREF;VALUE;N`.
///
/// `XREF` and `VALUE` are `true`, `false` or empty, `N` is the 0-based line
/// number among the matching siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathStep {
    pub name: String,
    pub selector: Selector,
    pub line_number: usize,
}

impl PathStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

impl FromStr for PathStep {
    type Err = &'static str;

    fn from_str(step: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = step.split(';').collect();
        let name = fields[0];
        if name.is_empty() {
            return Err("empty line id");
        }

        let number = |field: &str| match field {
            "" => Ok(0),
            _ => field.parse::<usize>().map_err(|_| "invalid line number"),
        };
        let flag = |field: &str, reason| match field {
            "" => Ok(None),
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(reason),
        };

        let mut parsed = Self::new(name);
        match fields[1..] {
            [] => {}
            [line_number] if line_number.bytes().all(|byte| byte.is_ascii_digit()) => {
                parsed.line_number = number(line_number)?;
            }
            [tag, ref rest @ ..] if rest.len() <= 3 => {
                if !tag.is_empty() {
                    parsed.selector.tag = Some(tag.to_owned());
                }
                let xref = flag(rest.first().copied().unwrap_or_default(), "invalid xref flag")?;
                let value = flag(rest.get(1).copied().unwrap_or_default(), "invalid value flag")?;
                if xref.is_some() || value.is_some() {
                    parsed.selector.xref_value =
                        Some((xref.unwrap_or_default(), value.unwrap_or_default()));
                }
                parsed.line_number = number(rest.get(2).copied().unwrap_or_default())?;
            }
            _ => return Err("too many fields"),
        }
        Ok(parsed)
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.selector == Selector::default() {
            return match self.line_number {
                0 => Ok(()),
                line_number => write!(f, ";{line_number}"),
            };
        }

        let tag = self.selector.tag.as_deref().unwrap_or_default();
        match self.selector.xref_value {
            Some((xref, value)) => write!(f, ";{tag};{xref};{value};{}", self.line_number),
            None => write!(f, ";{tag};;;{}", self.line_number),
        }
    }
}

fn at<E: Into<PathErrorKind>>(step: usize) -> impl FnOnce(E) -> (usize, PathErrorKind) {
    move |error| (step, error.into())
}

/// Nodes matched by the existing prefix of a path.
struct Resolution {
    matched: Vec<Node>,
    next: usize,
}

impl Tree<'_> {
    /// Walks `path` from `start`, creating the missing suffix.
    ///
    /// A step whose line number equals the count of matching siblings creates
    /// the next instance. A larger line number is an error. Nodes created
    /// before an error stay in the tree.
    pub fn follow_path<S: AsRef<str>>(
        &mut self,
        start: Node,
        path: &[S],
        mode: FollowMode,
    ) -> Result<Node, PathError> {
        let text: Vec<String> = path.iter().map(|step| step.as_ref().to_owned()).collect();
        let steps = text
            .iter()
            .enumerate()
            .map(|(index, step)| {
                step.parse::<PathStep>().map_err(|reason| {
                    (index, PathErrorKind::InvalidStep { step: step.clone(), reason })
                })
            })
            .collect::<Result<Vec<_>, _>>();

        steps
            .and_then(|steps| self.follow_steps(start, &steps, mode))
            .map_err(|(step, kind)| PathError { path: text, step, kind })
    }

    /// [`Tree::follow_path`] for already parsed steps.
    pub fn follow_path_steps(
        &mut self,
        start: Node,
        steps: &[PathStep],
        mode: FollowMode,
    ) -> Result<Node, PathError> {
        self.follow_steps(start, steps, mode).map_err(|(step, kind)| PathError {
            path: steps.iter().map(ToString::to_string).collect(),
            step,
            kind,
        })
    }

    fn follow_steps(
        &mut self,
        start: Node,
        steps: &[PathStep],
        mode: FollowMode,
    ) -> Result<Node, (usize, PathErrorKind)> {
        let Resolution { matched, next } = self.resolve(start, steps)?;
        let last = matched.last().copied().unwrap_or(start);
        if next < steps.len() {
            return self.create(last, steps, next);
        }

        match mode {
            FollowMode::Existing => Ok(last),
            FollowMode::CreateNew => {
                let split = matched.iter().rposition(|&node| self.allows_sibling(node));
                let Some(split) = split else {
                    return Err((steps.len().saturating_sub(1), PathErrorKind::NoSplitPoint));
                };
                trace!(step = %steps[split], "branching off a new line");
                let sibling = self.new_line(matched[split]).map_err(at(split))?;
                self.create(sibling, steps, split + 1)
            }
        }
    }

    /// Matches the longest existing prefix of `steps`.
    fn resolve(
        &self,
        start: Node,
        steps: &[PathStep],
    ) -> Result<Resolution, (usize, PathErrorKind)> {
        let mut current = start;
        let mut matched = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            self.schema_line(current, &step.name).map_err(at(index))?;

            let existing = self.matching_children(current, &step.name, &step.selector);
            match existing.get(step.line_number) {
                Some(&child) => {
                    matched.push(child);
                    current = child;
                }
                None if step.line_number == existing.len() => {
                    return Ok(Resolution { matched, next: index });
                }
                None => {
                    let kind = PathErrorKind::LineNumber {
                        name: step.name.clone(),
                        requested: step.line_number,
                        available: existing.len(),
                    };
                    return Err((index, kind));
                }
            }
        }
        Ok(Resolution { matched, next: steps.len() })
    }

    fn create(
        &mut self,
        mut current: Node,
        steps: &[PathStep],
        from: usize,
    ) -> Result<Node, (usize, PathErrorKind)> {
        for (index, step) in steps.iter().enumerate().skip(from) {
            let available = self.matching_children(current, &step.name, &step.selector).len();
            if step.line_number != available {
                let kind = PathErrorKind::LineNumber {
                    name: step.name.clone(),
                    requested: step.line_number,
                    available,
                };
                return Err((index, kind));
            }

            trace!(step = %step, "creating line");
            current =
                self.add_child_line(current, &step.name, &step.selector).map_err(at(index))?;
        }
        Ok(current)
    }
}
