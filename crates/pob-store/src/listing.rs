//! Plain-text object listings.
//!
//! A listing is a sequence of indirect objects followed by one trailer:
//!
//! ```text
//! 1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj
//! 2 0 obj << /Type /Pages /Kids [] /Count 0 >> endobj
//! trailer << /Root 1 0 R >>
//! ```

use nom::{
    combinator::{all_consuming, opt},
    multi::many0,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};
use pob_types::ObjectRef;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::literal::{keyword, pdf_value, to_store_error, unsigned, ws, ws1};
use crate::memory::Document;
use crate::value::PdfValue;

type Listing = (Vec<(ObjectRef, PdfValue)>, Option<PdfValue>);

fn indirect_object(input: &str) -> IResult<&str, (ObjectRef, PdfValue)> {
    let (input, (number, _, generation, _, _)) =
        tuple((unsigned::<u32>, ws1, unsigned::<u16>, ws1, keyword("obj")))(input)?;
    let (input, value) = delimited(ws, pdf_value, ws)(input)?;
    let (input, _) = terminated(keyword("endobj"), ws)(input)?;
    Ok((input, (ObjectRef::new(number, generation), value)))
}

fn listing(input: &str) -> IResult<&str, Listing> {
    let (input, objects) = preceded(ws, many0(indirect_object))(input)?;
    let (input, trailer) = opt(delimited(
        terminated(keyword("trailer"), ws),
        pdf_value,
        ws,
    ))(input)?;
    Ok((input, (objects, trailer)))
}

impl Document {
    /// Build a document from a textual object listing.
    ///
    /// The trailer is mandatory. Defining the same object twice is an error.
    pub fn from_listing(text: &str) -> StoreResult<Self> {
        let (objects, trailer) = match all_consuming(listing)(text) {
            Ok((_, parsed)) => parsed,
            Err(e) => return Err(to_store_error(text, e)),
        };
        let trailer = trailer.ok_or(StoreError::MissingTrailer)?;

        let mut doc = Document::new();
        for (reference, value) in objects {
            doc.insert_object(reference, value)?;
        }
        doc.set_trailer(trailer)?;
        debug!(objects = doc.object_count(), "loaded object listing");
        Ok(doc)
    }

    /// Render the document back into listing form, objects in number order.
    pub fn to_listing(&self) -> StoreResult<String> {
        use crate::traits::ObjectStore;

        let mut out = String::new();
        for (reference, id) in self.objects() {
            out.push_str(&reference.obj_label());
            out.push('\n');
            out.push_str(&self.encode(id)?);
            out.push_str("\nendobj\n");
        }
        out.push_str("trailer\n");
        out.push_str(&self.encode(self.trailer())?);
        out.push('\n');
        Ok(out)
    }
}
