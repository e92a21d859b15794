//! The document-level object graph: loads a PDF's full indirect-object
//! table, walks its page tree, and drives content-stream recoloring across
//! pages and the form XObjects/patterns they reference.
//!
//! Loading reuses `parser::{PdfReader, PdfDocument}`. Emission follows the
//! same object/xref/trailer conventions but is reimplemented in
//! [`writer::GraphWriter`] against this module's in-memory object graph
//! rather than a generation-time `Document`/`Page` builder.

pub mod writer;

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::content::{self, ColorSpaceFamily, ColorSpaceTable, RewriteOutcome};
use crate::error::{PdfNoirError, Result};
use crate::geometry::{Point, Rectangle};
use crate::parser::document::PdfDocument;
use crate::parser::objects::{PdfArray, PdfDictionary, PdfObject, PdfStream};
use crate::parser::reader::PdfReader;
use crate::theme::Theme;

const NULL_OBJECT: PdfObject = PdfObject::Null;

/// A page's `/Contents` entry: either a single stream or an array of them,
/// identified by their object references (not their resolved bytes).
#[derive(Debug, Clone)]
pub enum ContentsRef {
    Single((u32, u16)),
    Array(Vec<(u32, u16)>),
}

/// A page as seen by the recoloring pipeline: its size, its content
/// stream(s), and its resolved (inheritance-merged) resource dictionary.
#[derive(Debug, Clone)]
pub struct PageView {
    /// Reference to the page object itself, needed to rewrite `/Contents`
    /// in place when a background-only stream is spliced into an array.
    pub page_ref: (u32, u16),
    pub media_box: Rectangle,
    pub contents: ContentsRef,
    pub resources: PdfDictionary,
}

/// Cooperative cancellation flag shared across worker threads in
/// [`PdfGraph::recolor_all_pages_parallel`].
#[derive(Default)]
pub struct Cancellation(AtomicBool);

impl Cancellation {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The full in-memory object graph of a parsed PDF, ready for in-place
/// content-stream recoloring and reserialization.
pub struct PdfGraph {
    objects: HashMap<(u32, u16), PdfObject>,
    trailer: PdfDictionary,
    pages: Vec<PageView>,
    next_obj_num: u32,
}

impl PdfGraph {
    /// Parse `bytes` into the full object graph and page list.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes.to_vec());
        let reader = PdfReader::new(cursor)?;
        let document = PdfDocument::new(reader);

        let mut objects = HashMap::new();
        let mut max_obj_num = 0u32;
        for (obj_num, gen_num) in document.object_refs() {
            max_obj_num = max_obj_num.max(obj_num);
            let obj = document.get_object(obj_num, gen_num)?;
            objects.insert((obj_num, gen_num), obj);
        }

        let page_count = document.page_count()?;
        let mut pages = Vec::with_capacity(page_count as usize);
        for index in 0..page_count {
            let parsed = document.get_page(index)?;
            let [llx, lly, urx, ury] = parsed.media_box;
            let media_box = Rectangle::new(Point::new(llx, lly), Point::new(urx, ury));
            let resources = document
                .get_page_resources(&parsed)?
                .cloned()
                .unwrap_or_else(PdfDictionary::new);
            let contents = match parsed.dict.get("Contents") {
                Some(PdfObject::Reference(n, g)) => ContentsRef::Single((*n, *g)),
                Some(PdfObject::Array(arr)) => ContentsRef::Array(
                    arr.0
                        .iter()
                        .filter_map(|obj| obj.as_reference())
                        .collect(),
                ),
                _ => ContentsRef::Array(Vec::new()),
            };

            pages.push(PageView {
                page_ref: parsed.obj_ref,
                media_box,
                contents,
                resources,
            });
        }

        let trailer = document.trailer_dict();

        Ok(PdfGraph {
            objects,
            trailer,
            pages,
            next_obj_num: max_obj_num + 1,
        })
    }

    pub fn pages(&self) -> &[PageView] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn resolve<'a>(&'a self, obj: &'a PdfObject) -> &'a PdfObject {
        match obj {
            PdfObject::Reference(n, g) => self.objects.get(&(*n, *g)).unwrap_or(&NULL_OBJECT),
            other => other,
        }
    }

    fn allocate_obj_num(&mut self) -> u32 {
        let num = self.next_obj_num;
        self.next_obj_num += 1;
        num
    }

    /// Build the color-space lookup table this page (or form/pattern's own
    /// resources) makes available under `/Resources/ColorSpace`. Only
    /// device-equivalent spaces (ICCBased with a recognizable component
    /// count) are resolved; anything else (Indexed, Separation, DeviceN)
    /// is left out of the table, which makes `sc`/`scn` against it a
    /// pass-through per `spec.md` §4.3.
    fn color_space_table(&self, resources: &PdfDictionary) -> ColorSpaceTable {
        let mut table = ColorSpaceTable::new();
        let Some(PdfObject::Dictionary(spaces)) =
            resources.get("ColorSpace").map(|o| self.resolve(o))
        else {
            return table;
        };

        for (name, value) in spaces.0.iter() {
            if let Some(family) = self.resolve_color_space_family(value) {
                table.insert(name.0.clone(), family);
            }
        }
        table
    }

    fn resolve_color_space_family(&self, value: &PdfObject) -> Option<ColorSpaceFamily> {
        match self.resolve(value) {
            PdfObject::Name(name) => ColorSpaceFamily::from_literal_name(&name.0),
            PdfObject::Array(arr) => {
                let head = arr.0.first().and_then(|o| self.resolve(o).as_name())?;
                match head.0.as_str() {
                    "ICCBased" => {
                        let stream_obj = arr.0.get(1).map(|o| self.resolve(o))?;
                        let n = stream_obj.as_stream()?.dict.get("N")?.as_integer()?;
                        match n {
                            1 => Some(ColorSpaceFamily::DeviceGray),
                            3 => Some(ColorSpaceFamily::DeviceRgb),
                            4 => Some(ColorSpaceFamily::DeviceCmyk),
                            _ => None,
                        }
                    }
                    "CalRGB" => Some(ColorSpaceFamily::DeviceRgb),
                    "CalGray" => Some(ColorSpaceFamily::DeviceGray),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Recolor one page: rewrite its own content stream(s), splice in the
    /// background-fill prologue, and walk reachable form XObjects /
    /// tiling patterns (deduped across the whole document via `visited`).
    ///
    /// A page whose rewrite panics or fails is never allowed to poison the
    /// rest of the document: the panic is caught, the page's *original*
    /// content is kept, and the background prologue is still prepended so
    /// the page at least gets the right backdrop.
    pub fn recolor_page(
        &mut self,
        index: usize,
        theme: &'static Theme,
        visited: &mut HashSet<(u32, u16)>,
    ) -> Result<()> {
        let page = self.pages[index].clone();
        let color_spaces = self.color_space_table(&page.resources);

        self.recolor_resources(&page.resources, theme, visited);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.recolor_page_contents(&page, theme, &color_spaces)
        }));

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                debug!(page = index, error = %err, "page rewrite failed, falling back to original content plus background");
                self.fallback_page(&page, theme)
            }
            Err(_) => {
                debug!(page = index, "page rewrite panicked, falling back to original content plus background");
                self.fallback_page(&page, theme)
            }
        }
    }

    fn recolor_page_contents(
        &mut self,
        page: &PageView,
        theme: &Theme,
        color_spaces: &ColorSpaceTable,
    ) -> Result<()> {
        match &page.contents {
            ContentsRef::Single(obj_ref) => {
                let original = self.stream_data(*obj_ref)?;
                let outcome = content::rewrite(&original, theme, color_spaces)?;
                let mut body = content::prologue_bytes(theme, &page.media_box);
                body.extend_from_slice(&outcome.into_bytes());
                self.replace_stream(*obj_ref, body);
            }
            ContentsRef::Array(obj_refs) => {
                for obj_ref in obj_refs {
                    let original = self.stream_data(*obj_ref)?;
                    match content::rewrite(&original, theme, color_spaces)? {
                        RewriteOutcome::Rewritten(bytes) => self.replace_stream(*obj_ref, bytes),
                        RewriteOutcome::Unchanged(_) => {}
                    }
                }
                self.splice_background_stream(page, theme)?;
            }
        }
        Ok(())
    }

    /// Content stays untouched; only the background prologue is prepended
    /// (as its own new stream for an array, or merged in for a single one).
    fn fallback_page(&mut self, page: &PageView, theme: &Theme) -> Result<()> {
        match &page.contents {
            ContentsRef::Single(obj_ref) => {
                let original = self.stream_data(*obj_ref)?;
                let mut body = content::prologue_bytes(theme, &page.media_box);
                body.extend_from_slice(&original);
                self.replace_stream(*obj_ref, body);
            }
            ContentsRef::Array(_) => {
                self.splice_background_stream(page, theme)?;
            }
        }
        Ok(())
    }

    fn splice_background_stream(&mut self, page: &PageView, theme: &Theme) -> Result<()> {
        let prologue = content::prologue_bytes(theme, &page.media_box);
        let obj_num = self.allocate_obj_num();
        let obj_ref = (obj_num, 0);
        let mut dict = PdfDictionary::new();
        dict.insert("Length".to_string(), PdfObject::Integer(prologue.len() as i64));
        self.objects.insert(
            obj_ref,
            PdfObject::Stream(PdfStream {
                dict,
                data: prologue,
            }),
        );

        let page_obj = self
            .objects
            .get(&page.page_ref)
            .and_then(|o| o.as_dict())
            .cloned()
            .ok_or_else(|| PdfNoirError::Serialize("page object missing from graph".into()))?;

        let mut new_contents = PdfArray(vec![PdfObject::Reference(obj_ref.0, obj_ref.1)]);
        if let ContentsRef::Array(existing) = &page.contents {
            for (n, g) in existing {
                new_contents.0.push(PdfObject::Reference(*n, *g));
            }
        }

        let mut page_obj = page_obj;
        page_obj.insert("Contents".to_string(), PdfObject::Array(new_contents));
        self.objects
            .insert(page.page_ref, PdfObject::Dictionary(page_obj));
        Ok(())
    }

    fn stream_data(&self, obj_ref: (u32, u16)) -> Result<Vec<u8>> {
        let obj = self
            .objects
            .get(&obj_ref)
            .ok_or_else(|| PdfNoirError::Parse(format!("missing content object {obj_ref:?}")))?;
        let stream = obj
            .as_stream()
            .ok_or_else(|| PdfNoirError::Parse(format!("object {obj_ref:?} is not a stream")))?;
        Ok(stream.decode()?)
    }

    /// Replace a content stream's data with freshly rewritten bytes. The
    /// original filter chain no longer matches (the byte length and
    /// contents changed), so the object is rewritten uncompressed; a
    /// standards-conforming reader treats a stream with no `/Filter` entry
    /// as raw bytes.
    fn replace_stream(&mut self, obj_ref: (u32, u16), data: Vec<u8>) {
        if let Some(PdfObject::Stream(stream)) = self.objects.get(&obj_ref) {
            let mut dict = stream.dict.clone();
            dict.0.remove(&crate::parser::objects::PdfName("Filter".to_string()));
            dict.0.remove(&crate::parser::objects::PdfName(
                "DecodeParms".to_string(),
            ));
            dict.insert("Length".to_string(), PdfObject::Integer(data.len() as i64));
            self.objects
                .insert(obj_ref, PdfObject::Stream(PdfStream { dict, data }));
        }
    }

    /// Walk `/Resources/XObject` (Form subtype) and `/Resources/Pattern`
    /// (tiling, PatternType 1) entries reachable from `resources`,
    /// rewriting each stream's content at most once across the whole
    /// document.
    fn recolor_resources(
        &mut self,
        resources: &PdfDictionary,
        theme: &Theme,
        visited: &mut HashSet<(u32, u16)>,
    ) {
        let xobject_refs = self.collect_named_refs(resources, "XObject");
        for obj_ref in xobject_refs {
            self.recolor_form_or_pattern(obj_ref, theme, visited, "Form", "Subtype");
        }

        let pattern_refs = self.collect_named_refs(resources, "Pattern");
        for obj_ref in pattern_refs {
            self.recolor_form_or_pattern(obj_ref, theme, visited, "1", "PatternType");
        }
    }

    fn collect_named_refs(&self, resources: &PdfDictionary, key: &str) -> Vec<(u32, u16)> {
        let Some(PdfObject::Dictionary(dict)) = resources.get(key).map(|o| self.resolve(o))
        else {
            return Vec::new();
        };
        dict.0.values().filter_map(|o| o.as_reference()).collect()
    }

    fn recolor_form_or_pattern(
        &mut self,
        obj_ref: (u32, u16),
        theme: &Theme,
        visited: &mut HashSet<(u32, u16)>,
        want_subtype: &str,
        subtype_key: &str,
    ) {
        if visited.contains(&obj_ref) {
            return;
        }
        visited.insert(obj_ref);

        let Some(PdfObject::Stream(stream)) = self.objects.get(&obj_ref) else {
            return;
        };

        let matches = match stream.dict.get(subtype_key) {
            Some(PdfObject::Name(n)) => n.0 == want_subtype,
            Some(PdfObject::Integer(i)) => i.to_string() == want_subtype,
            _ => false,
        };
        if !matches {
            return;
        }

        let own_resources = stream
            .dict
            .get("Resources")
            .and_then(|o| self.resolve(o).as_dict())
            .cloned();

        let color_spaces = own_resources
            .as_ref()
            .map(|r| self.color_space_table(r))
            .unwrap_or_default();

        if let Some(resources) = &own_resources {
            self.recolor_resources(resources, theme, visited);
        }

        if let Ok(original) = self.stream_data(obj_ref) {
            if let Ok(RewriteOutcome::Rewritten(bytes)) =
                content::rewrite(&original, theme, &color_spaces)
            {
                self.replace_stream(obj_ref, bytes);
            }
        }
    }

    /// Recolor every page sequentially, deduping form/pattern rewrites
    /// across the whole document. Matches "single-threaded cooperative per
    /// document" from `spec.md` §5.
    pub fn recolor_all_pages(&mut self, theme: &'static Theme) -> Result<()> {
        let mut visited = HashSet::new();
        for index in 0..self.pages.len() {
            self.recolor_page(index, theme, &mut visited)?;
        }
        Ok(())
    }

    /// Recolor pages across a `std::thread::scope` fan-out. Each page's own
    /// content rewrite runs independently; shared form/pattern streams are
    /// deduped through a `Mutex`-guarded visited set so each such object is
    /// rewritten by exactly one worker, and the final write-back into the
    /// shared object table is serialized behind the same mutex.
    pub fn recolor_all_pages_parallel(
        &mut self,
        theme: &'static Theme,
        cancel: &Cancellation,
    ) -> Result<()> {
        let worker_count = num_cpus::get().max(1).min(self.pages.len().max(1));
        let page_indices: Vec<usize> = (0..self.pages.len()).collect();
        let chunks: Vec<&[usize]> = page_indices.chunks(
            (page_indices.len() / worker_count).max(1),
        ).collect();

        let graph = std::sync::Mutex::new(self);
        let visited = std::sync::Mutex::new(HashSet::new());
        let first_error = std::sync::Mutex::new(None);

        std::thread::scope(|scope| {
            for chunk in &chunks {
                let graph = &graph;
                let visited = &visited;
                let first_error = &first_error;
                scope.spawn(move || {
                    for &index in *chunk {
                        if cancel.is_cancelled() {
                            return;
                        }
                        let mut visited = visited.lock().unwrap();
                        let mut graph = graph.lock().unwrap();
                        if let Err(err) = graph.recolor_page(index, theme, &mut visited) {
                            *first_error.lock().unwrap() = Some(err);
                        }
                    }
                });
            }
        });

        if cancel.is_cancelled() {
            return Err(PdfNoirError::Cancelled);
        }
        if let Some(err) = first_error.into_inner().unwrap() {
            return Err(err);
        }
        Ok(())
    }

    pub fn objects(&self) -> &HashMap<(u32, u16), PdfObject> {
        &self.objects
    }

    pub fn trailer(&self) -> &PdfDictionary {
        &self.trailer
    }
}
