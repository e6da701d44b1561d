use pest::{error::Error, iterators::Pairs, Parser};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "c.pest"]
pub struct CParser;

impl CParser {
    pub fn parse_program(program: &str) -> Result<Pairs<Rule>, Box<Error<Rule>>> {
        Self::parse(Rule::program, program).map_err(Box::new)
    }
}
