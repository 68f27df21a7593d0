//! Access-script parsing for the driver binary.
//!
//! A script's first non-comment line gives the three segment sizes; every
//! following line is one command. `#` starts a comment, blank lines are
//! ignored:
//!
//! ```text
//! 16 8 176          # text data bss+heap+stack
//! load 0
//! store 16 A
//! table
//! memory
//! swap
//! ```

use std::fs;
use std::path::Path;

use crate::constants::{NUM_PAGES, PAGE_SIZE};

/// One operation from an access script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Load { address: usize },
    Store { address: usize, value: u8 },
    DumpMemory,
    DumpSwap,
    DumpPageTable,
}

/// A parsed access script: segment sizes plus the command sequence.
#[derive(Debug)]
pub struct Script {
    pub text_size: usize,
    pub data_size: usize,
    pub bss_heap_stack_size: usize,
    pub commands: Vec<Command>,
}

impl Script {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read script file: {}", e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.split('#').next().unwrap_or("").trim()))
            .filter(|(_, line)| !line.is_empty());

        let (header_no, header) = lines.next().ok_or("Script is empty".to_string())?;
        let (text_size, data_size, bss_heap_stack_size) = Self::parse_header(header_no, header)?;

        let mut commands = Vec::new();
        for (line_no, line) in lines {
            commands.push(Self::parse_command(line_no, line)?);
        }

        Ok(Script {
            text_size,
            data_size,
            bss_heap_stack_size,
            commands,
        })
    }

    fn parse_header(line_no: usize, line: &str) -> Result<(usize, usize, usize), String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 3 {
            return Err(format!(
                "Line {}: expected 3 segment sizes, got {} tokens",
                line_no,
                tokens.len()
            ));
        }
        let sizes: Vec<usize> = tokens
            .iter()
            .map(|t| {
                t.parse()
                    .map_err(|_| format!("Line {}: invalid segment size: {}", line_no, t))
            })
            .collect::<Result<_, _>>()?;

        let total: usize = sizes.iter().sum();
        if total > NUM_PAGES * PAGE_SIZE {
            return Err(format!(
                "Line {}: segments total {} bytes, exceeding the {}-byte address space",
                line_no,
                total,
                NUM_PAGES * PAGE_SIZE
            ));
        }
        Ok((sizes[0], sizes[1], sizes[2]))
    }

    fn parse_command(line_no: usize, line: &str) -> Result<Command, String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens[0] {
            "load" => {
                if tokens.len() != 2 {
                    return Err(format!("Line {}: usage: load <address>", line_no));
                }
                let address = Self::parse_address(line_no, tokens[1])?;
                Ok(Command::Load { address })
            }
            "store" => {
                if tokens.len() != 3 {
                    return Err(format!("Line {}: usage: store <address> <char>", line_no));
                }
                let address = Self::parse_address(line_no, tokens[1])?;
                let value = match tokens[2].as_bytes() {
                    [b] => *b,
                    _ => {
                        return Err(format!(
                            "Line {}: store value must be a single character, got: {}",
                            line_no, tokens[2]
                        ));
                    }
                };
                Ok(Command::Store { address, value })
            }
            "memory" => Ok(Command::DumpMemory),
            "swap" => Ok(Command::DumpSwap),
            "table" => Ok(Command::DumpPageTable),
            other => Err(format!("Line {}: unknown command: {}", line_no, other)),
        }
    }

    fn parse_address(line_no: usize, token: &str) -> Result<usize, String> {
        token
            .parse()
            .map_err(|_| format!("Line {}: invalid address: {}", line_no, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_script() {
        let script = Script::parse(
            "16 8 176\n\
             load 0\n\
             store 16 A\n\
             table\n\
             memory\n\
             swap\n",
        )
        .unwrap();

        assert_eq!(script.text_size, 16);
        assert_eq!(script.data_size, 8);
        assert_eq!(script.bss_heap_stack_size, 176);
        assert_eq!(
            script.commands,
            vec![
                Command::Load { address: 0 },
                Command::Store { address: 16, value: b'A' },
                Command::DumpPageTable,
                Command::DumpMemory,
                Command::DumpSwap,
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let script = Script::parse(
            "# a demo\n\
             \n\
             16 8 176   # sizes\n\
             load 3     # first text page\n",
        )
        .unwrap();
        assert_eq!(script.commands, vec![Command::Load { address: 3 }]);
    }

    #[test]
    fn test_empty_script_rejected() {
        assert!(Script::parse("").is_err());
        assert!(Script::parse("# only comments\n").is_err());
    }

    #[test]
    fn test_bad_header_rejected() {
        assert!(Script::parse("16 8\nload 0\n").is_err());
        assert!(Script::parse("16 eight 176\n").is_err());
        // segments cannot exceed the virtual address range
        assert!(Script::parse("100 100 100\n").is_err());
    }

    #[test]
    fn test_bad_commands_rejected() {
        assert!(Script::parse("16 8 176\njump 0\n").is_err());
        assert!(Script::parse("16 8 176\nload\n").is_err());
        assert!(Script::parse("16 8 176\nload zero\n").is_err());
        assert!(Script::parse("16 8 176\nstore 16 AB\n").is_err());
        assert!(Script::parse("16 8 176\nstore 16\n").is_err());
    }

    #[test]
    fn test_error_names_offending_line() {
        let err = Script::parse("16 8 176\nload 0\njump 4\n").unwrap_err();
        assert!(err.contains("Line 3"), "unexpected message: {err}");
    }
}
