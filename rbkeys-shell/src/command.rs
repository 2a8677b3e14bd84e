use std::fmt;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use log::{debug, info};
use rbkeys::{Config, Key, RbTree};
use rbkeys_io::{svg, text, DrawOptions};

const HELP: &str = "\
commands:
  insert K...   insert keys
  delete K...   delete keys
  find K...     look keys up
  print         show the tree as `c, k; ...` in preorder
  inorder       show the keys in ascending order
  height        show the height, black height and size
  check         verify the red-black rules
  draw FILE     write an SVG drawing of the tree
  save FILE     write the tree in the text format
  load FILE     replace the tree with one read from FILE
  clear         remove every key
  demo [N]      start over with the keys 1 to N (default 50)
  help          show this text
  quit          leave the shell";

const DEMO_KEYS: Key = 50;

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert(Vec<Key>),
    Delete(Vec<Key>),
    Find(Vec<Key>),
    Print,
    Inorder,
    Height,
    Check,
    Draw(PathBuf),
    Save(PathBuf),
    Load(PathBuf),
    Clear,
    Demo(Key),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Unknown(String),
    MissingArgument(&'static str),
    UnexpectedArgument(String),
    BadKey(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "unknown command `{}`, try `help`", name),
            Self::MissingArgument(what) => write!(f, "missing {}", what),
            Self::UnexpectedArgument(arg) => write!(f, "unexpected argument `{}`", arg),
            Self::BadKey(key) => write!(f, "`{}` is not an integer key", key),
        }
    }
}

impl std::error::Error for CommandError {}

fn keys<'a>(args: impl Iterator<Item = &'a str>) -> Result<Vec<Key>, CommandError> {
    let keys = args
        .map(|arg| arg.parse().map_err(|_| CommandError::BadKey(arg.to_string())))
        .collect::<Result<Vec<Key>, _>>()?;
    if keys.is_empty() {
        return Err(CommandError::MissingArgument("keys"));
    }
    Ok(keys)
}

impl FromStr for Command {
    type Err = CommandError;

    /// Parse a non-blank line: a command name followed by whitespace separated arguments.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();

        let command = match name {
            "insert" | "i" => return Ok(Self::Insert(keys(words)?)),
            "delete" | "d" => return Ok(Self::Delete(keys(words)?)),
            "find" | "f" => return Ok(Self::Find(keys(words)?)),
            "draw" | "save" | "load" => {
                let path = words
                    .next()
                    .map(PathBuf::from)
                    .ok_or(CommandError::MissingArgument("file name"))?;
                match name {
                    "draw" => Self::Draw(path),
                    "save" => Self::Save(path),
                    _ => Self::Load(path),
                }
            }
            "demo" => match words.next() {
                Some(count) => Self::Demo(
                    count
                        .parse()
                        .map_err(|_| CommandError::BadKey(count.to_string()))?,
                ),
                None => Self::Demo(DEMO_KEYS),
            },
            "print" | "p" => Self::Print,
            "inorder" => Self::Inorder,
            "height" => Self::Height,
            "check" => Self::Check,
            "clear" => Self::Clear,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        match words.next() {
            Some(extra) => Err(CommandError::UnexpectedArgument(extra.to_string())),
            None => Ok(command),
        }
    }
}

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Holds the tree and reports the outcome of every command to `out`.
pub struct Shell<W: Write> {
    tree: RbTree,
    config: Config,
    draw: DrawOptions,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(config: Config, out: W) -> Self {
        Self {
            tree: RbTree::with_config(config),
            config,
            draw: DrawOptions::default(),
            out,
        }
    }

    /// Execute commands line by line until `quit` or the end of the input. Blank lines and lines
    /// starting with `#` are skipped. Command failures are reported and do not stop the shell.
    pub fn run<R: BufRead>(&mut self, input: R, prompt: bool) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            if prompt {
                write!(self.out, "> ")?;
                self.out.flush()?;
            }

            let line = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.parse::<Command>() {
                Ok(command) => {
                    if self.execute(command)? == Flow::Quit {
                        break;
                    }
                }
                Err(e) => writeln!(self.out, "error: {}", e)?,
            }
        }
        self.out.flush()
    }

    /// Execute one command. Only failures to write the report are returned as errors.
    pub fn execute(&mut self, command: Command) -> io::Result<Flow> {
        debug!("Executing {:?}", command);

        match command {
            Command::Insert(keys) => {
                for key in keys {
                    match self.tree.insert(key) {
                        Ok(()) => writeln!(self.out, "inserted {}", key)?,
                        Err(e) => writeln!(self.out, "error: {}", e)?,
                    }
                }
            }
            Command::Delete(keys) => {
                for key in keys {
                    match self.tree.delete(key) {
                        Ok(()) => writeln!(self.out, "deleted {}", key)?,
                        Err(e) => writeln!(self.out, "error: {}", e)?,
                    }
                }
            }
            Command::Find(keys) => {
                for key in keys {
                    let outcome = if self.tree.contains(key) {
                        "found"
                    } else {
                        "not found"
                    };
                    writeln!(self.out, "{}: {}", key, outcome)?;
                }
            }
            Command::Print => self.print()?,
            Command::Inorder => {
                if self.tree.is_empty() {
                    writeln!(self.out, "(empty)")?;
                } else {
                    let keys: Vec<String> = self.tree.iter().map(|key| key.to_string()).collect();
                    writeln!(self.out, "{}", keys.join(" "))?;
                }
            }
            Command::Height => writeln!(
                self.out,
                "height {}, black height {}, {} keys",
                self.tree.height(),
                self.tree.black_height(),
                self.tree.len()
            )?,
            Command::Check => match self.tree.validate() {
                Ok(()) => writeln!(self.out, "ok")?,
                Err(v) => writeln!(self.out, "error: {}", v)?,
            },
            Command::Draw(path) => match svg::draw_to_file(&self.tree, &path, self.draw) {
                Ok(true) => writeln!(self.out, "wrote {}", path.display())?,
                Ok(false) => writeln!(self.out, "empty tree, nothing drawn")?,
                Err(e) => writeln!(self.out, "error: {}: {}", path.display(), e)?,
            },
            Command::Save(path) => {
                let mut contents = text::write(&self.tree);
                contents.push('\n');
                match fs::write(&path, contents) {
                    Ok(()) => writeln!(
                        self.out,
                        "saved {} keys to {}",
                        self.tree.len(),
                        path.display()
                    )?,
                    Err(e) => writeln!(self.out, "error: {}: {}", path.display(), e)?,
                }
            }
            Command::Load(path) => {
                let loaded = fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|input| {
                        text::read_tree_with_config(&input, self.config).map_err(|e| e.to_string())
                    });
                match loaded {
                    Ok(tree) => {
                        info!("Loaded {} keys from {}", tree.len(), path.display());
                        self.tree = tree;
                        writeln!(
                            self.out,
                            "loaded {} keys from {}",
                            self.tree.len(),
                            path.display()
                        )?;
                    }
                    Err(e) => writeln!(self.out, "error: {}: {}", path.display(), e)?,
                }
            }
            Command::Clear => {
                self.tree.clear();
                writeln!(self.out, "cleared")?;
            }
            Command::Demo(count) => {
                self.tree.clear();
                for key in 1..=count {
                    if let Err(e) = self.tree.insert(key) {
                        writeln!(self.out, "error: {}", e)?;
                        break;
                    }
                }
                self.print()?;
            }
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn print(&mut self) -> io::Result<()> {
        if self.tree.is_empty() {
            writeln!(self.out, "(empty)")
        } else {
            writeln!(self.out, "{}", text::write(&self.tree))
        }
    }
}
