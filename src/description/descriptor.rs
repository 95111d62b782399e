/// JVM type descriptor and method descriptor parser.
use nom::{
    branch::alt,
    bytes::complete::take_till1,
    character::complete::{char, one_of},
    combinator::{all_consuming, map, map_opt},
    multi::{fold_many_m_n, many0},
    sequence::{delimited, pair},
    IResult,
};

use crate::error::{Error, Result};

use super::types::{PrimitiveType, TypeDescription};

fn primitive_for(code: char) -> Option<PrimitiveType> {
    PrimitiveType::ALL.into_iter().find(|p| p.descriptor() == code)
}

fn base_type(input: &str) -> IResult<&str, TypeDescription> {
    map_opt(one_of("ZBSCIJFD"), |c| primitive_for(c).map(TypeDescription::Primitive))(input)
}

fn object_type(input: &str) -> IResult<&str, TypeDescription> {
    map(
        delimited(char('L'), take_till1(|c| c == ';'), char(';')),
        |name: &str| TypeDescription::reference(name),
    )(input)
}

/// Array types may declare at most this many dimensions.
pub const MAX_ARRAY_DIMENSIONS: usize = 255;

fn array_type(input: &str) -> IResult<&str, TypeDescription> {
    let (input, dimensions) = fold_many_m_n(1, MAX_ARRAY_DIMENSIONS, char('['), || 0usize, |n, _| n + 1)(input)?;
    let (input, component) = alt((base_type, object_type))(input)?;
    let array = (0..dimensions).fold(component, |ty, _| TypeDescription::array_of(ty));
    Ok((input, array))
}

fn field_type(input: &str) -> IResult<&str, TypeDescription> {
    alt((base_type, object_type, array_type))(input)
}

fn return_type(input: &str) -> IResult<&str, TypeDescription> {
    alt((map(char('V'), |_| TypeDescription::VOID), field_type))(input)
}

fn method_type(input: &str) -> IResult<&str, (Vec<TypeDescription>, TypeDescription)> {
    pair(delimited(char('('), many0(field_type), char(')')), return_type)(input)
}

/// Parse a full type descriptor string. `V` is accepted as the void return type.
pub fn parse_type_descriptor(desc: &str) -> Result<TypeDescription> {
    all_consuming(return_type)(desc)
        .map(|(_, ty)| ty)
        .map_err(|_| Error::InvalidDescriptor(desc.to_string()))
}

/// Parse a method descriptor, e.g. "(II)V" -> ([Int, Int], Void)
pub fn parse_method_descriptor(desc: &str) -> Result<(Vec<TypeDescription>, TypeDescription)> {
    all_consuming(method_type)(desc)
        .map(|(_, parsed)| parsed)
        .map_err(|_| Error::InvalidDescriptor(desc.to_string()))
}
