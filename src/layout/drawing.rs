//! Translates a page content stream into [`DrawOp`]s.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

use super::{as_number, resolve, DrawOp};
use crate::error::RedactorResult;

pub(super) fn page_ops(
    doc: &Document,
    page_id: ObjectId,
    max_depth: usize,
) -> RedactorResult<Vec<DrawOp>> {
    let content = doc.get_and_decode_page_content(page_id)?;

    let (inline, referenced) = doc.get_page_resources(page_id);
    let xobjects: Vec<&Dictionary> = inline
        .into_iter()
        .chain(
            referenced
                .into_iter()
                .filter_map(|id| doc.get_dictionary(id).ok()),
        )
        .filter_map(|resources| xobject_dict(doc, resources))
        .collect();

    let mut ops = Vec::new();
    Translator { doc, max_depth }.translate(&content.operations, &xobjects, 0, &mut ops);
    Ok(ops)
}

fn xobject_dict<'a>(doc: &'a Document, resources: &'a Dictionary) -> Option<&'a Dictionary> {
    match resolve(doc, resources.get(b"XObject").ok()?) {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

struct Translator<'a> {
    doc: &'a Document,
    max_depth: usize,
}

impl<'a> Translator<'a> {
    fn translate(
        &self,
        operations: &[Operation],
        xobjects: &[&'a Dictionary],
        depth: usize,
        out: &mut Vec<DrawOp>,
    ) {
        for op in operations {
            match op.operator.as_str() {
                "q" => out.push(DrawOp::Save),
                "Q" => out.push(DrawOp::Restore),
                "cm" => {
                    if let Some(matrix) = matrix(self.doc, &op.operands) {
                        out.push(DrawOp::Transform(matrix));
                    }
                }
                "BI" => out.push(DrawOp::PaintImage {
                    name: "inline".to_string(),
                }),
                "Do" => {
                    let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) else {
                        continue;
                    };
                    self.paint(name, xobjects, depth, out);
                }
                _ => {}
            }
        }
    }

    fn paint(&self, name: &[u8], xobjects: &[&'a Dictionary], depth: usize, out: &mut Vec<DrawOp>) {
        let name_str = String::from_utf8_lossy(name).into_owned();
        let Some(stream) = xobjects
            .iter()
            .find_map(|dict| dict.get(name).ok())
            .and_then(|o| resolve(self.doc, o).as_stream().ok())
        else {
            debug!(xobject = %name_str, "unresolved XObject");
            return;
        };

        match stream.dict.get(b"Subtype").and_then(Object::as_name) {
            Ok(b"Image") => out.push(DrawOp::PaintImage { name: name_str }),
            Ok(b"Form") if depth < self.max_depth => {
                self.inline_form(stream, &name_str, xobjects, depth, out)
            }
            Ok(b"Form") => warn!(xobject = %name_str, depth, "form nesting too deep, skipped"),
            _ => {}
        }
    }

    fn inline_form(
        &self,
        form: &'a Stream,
        name: &str,
        parent_xobjects: &[&'a Dictionary],
        depth: usize,
        out: &mut Vec<DrawOp>,
    ) {
        let bytes = form
            .decompressed_content()
            .unwrap_or_else(|_| form.content.clone());
        let content = match Content::decode(&bytes) {
            Ok(content) => content,
            Err(e) => {
                warn!(xobject = %name, error = %e, "form content could not be decoded");
                return;
            }
        };

        let own = form
            .dict
            .get(b"Resources")
            .ok()
            .map(|o| resolve(self.doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|resources| xobject_dict(self.doc, resources));
        let xobjects: Vec<&'a Dictionary> = match own {
            Some(dict) => vec![dict],
            None => parent_xobjects.to_vec(),
        };

        out.push(DrawOp::Save);
        if let Some(m) = form
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| resolve(self.doc, o).as_array().ok())
            .and_then(|values| matrix(self.doc, values))
        {
            out.push(DrawOp::Transform(m));
        }
        self.translate(&content.operations, &xobjects, depth + 1, out);
        out.push(DrawOp::Restore);
    }
}

fn matrix(doc: &Document, operands: &[Object]) -> Option<[f64; 6]> {
    let values: Vec<f64> = operands
        .iter()
        .filter_map(|o| as_number(resolve(doc, o)))
        .collect();
    values.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn image_stream() -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0u8],
        )
    }

    fn single_page(doc: &mut Document, content: &[u8], xobjects: Dictionary) -> ObjectId {
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => xobjects },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        page_id
    }

    #[test]
    fn test_image_placement_ops() {
        let mut doc = Document::with_version("1.5");
        let image_id = doc.add_object(image_stream());
        let page_id = single_page(
            &mut doc,
            b"q 120 0 0 120 40 672 cm /Im1 Do Q",
            dictionary! { "Im1" => image_id },
        );

        let ops = page_ops(&doc, page_id, 8).unwrap();
        assert_eq!(
            ops,
            vec![
                DrawOp::Save,
                DrawOp::Transform([120.0, 0.0, 0.0, 120.0, 40.0, 672.0]),
                DrawOp::PaintImage {
                    name: "Im1".to_string()
                },
                DrawOp::Restore,
            ]
        );
    }

    #[test]
    fn test_form_is_inlined_with_matrix() {
        let mut doc = Document::with_version("1.5");
        let image_id = doc.add_object(image_stream());
        let form_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 1.into(), 1.into()],
                "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 10.into(), 20.into()],
                "Resources" => dictionary! { "XObject" => dictionary! { "Photo" => image_id } },
            },
            b"/Photo Do".to_vec(),
        ));
        let page_id = single_page(&mut doc, b"/Fm1 Do", dictionary! { "Fm1" => form_id });

        let ops = page_ops(&doc, page_id, 8).unwrap();
        assert_eq!(
            ops,
            vec![
                DrawOp::Save,
                DrawOp::Transform([1.0, 0.0, 0.0, 1.0, 10.0, 20.0]),
                DrawOp::PaintImage {
                    name: "Photo".to_string()
                },
                DrawOp::Restore,
            ]
        );

        assert!(page_ops(&doc, page_id, 0).unwrap().is_empty());
    }
}
