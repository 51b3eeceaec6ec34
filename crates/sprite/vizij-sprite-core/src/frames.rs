//! Frame source and sink contracts.
//!
//! The player never looks inside a frame descriptor: it asks a [`FrameSource`]
//! for the descriptor at the current index and hands it to a [`FrameSink`].
//! Adapters (canvas, DOM, GPU) live outside this crate.

use serde::{Deserialize, Serialize};

use crate::error::SpriteError;

/// Ordered, read-only table of frame descriptors.
pub trait FrameSource {
    type Frame;

    /// Number of frames available.
    fn frame_count(&self) -> usize;

    /// Descriptor at `index`, or `None` past the end.
    fn frame(&self, index: usize) -> Option<&Self::Frame>;
}

impl<T> FrameSource for Vec<T> {
    type Frame = T;

    fn frame_count(&self) -> usize {
        self.len()
    }

    fn frame(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

impl<'a, T> FrameSource for &'a [T] {
    type Frame = T;

    fn frame_count(&self) -> usize {
        self.len()
    }

    fn frame(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

/// Draws one frame descriptor. Failures are reported, never retried.
pub trait FrameSink<F: ?Sized> {
    fn render(&mut self, frame: &F) -> Result<(), SpriteError>;
}

impl<F: ?Sized, C> FrameSink<F> for C
where
    C: FnMut(&F) -> Result<(), SpriteError>,
{
    fn render(&mut self, frame: &F) -> Result<(), SpriteError> {
        self(frame)
    }
}

/// Sink that keeps a copy of everything it renders.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink<F> {
    rendered: Vec<F>,
}

impl<F> RecordingSink<F> {
    pub fn new() -> Self {
        Self {
            rendered: Vec::new(),
        }
    }

    /// Descriptors in render order.
    pub fn rendered(&self) -> &[F] {
        &self.rendered
    }

    pub fn render_count(&self) -> usize {
        self.rendered.len()
    }

    pub fn last(&self) -> Option<&F> {
        self.rendered.last()
    }

    pub fn clear(&mut self) {
        self.rendered.clear();
    }
}

impl<F: Clone> FrameSink<F> for RecordingSink<F> {
    fn render(&mut self, frame: &F) -> Result<(), SpriteError> {
        self.rendered.push(frame.clone());
        Ok(())
    }
}

/// Rectangle of one cell in a sprite sheet, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Uniform grid over a sprite sheet, read left to right, top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSheet {
    frames: Vec<FrameRect>,
}

impl GridSheet {
    /// Slice a `sheet_width x sheet_height` image into `frame_width x frame_height`
    /// cells. Partial cells at the right and bottom edges are dropped.
    pub fn new(
        sheet_width: u32,
        sheet_height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, SpriteError> {
        Self::with_count(sheet_width, sheet_height, frame_width, frame_height, None)
    }

    /// Like [`GridSheet::new`], keeping at most `count` cells (sheets often have
    /// empty trailing cells).
    pub fn with_count(
        sheet_width: u32,
        sheet_height: u32,
        frame_width: u32,
        frame_height: u32,
        count: Option<usize>,
    ) -> Result<Self, SpriteError> {
        if frame_width == 0 || frame_height == 0 {
            return Err(SpriteError::InvalidFrameSize {
                width: frame_width,
                height: frame_height,
            });
        }
        let columns = sheet_width / frame_width;
        let rows = sheet_height / frame_height;
        let cells = columns
            .checked_mul(rows)
            .and_then(|cells| usize::try_from(cells).ok())
            .ok_or(SpriteError::GridTooLarge { columns, rows })?;
        let limit = count.map_or(cells, |c| c.min(cells));
        if limit == 0 {
            return Err(SpriteError::InvalidFrameCount { frame_count: 0 });
        }

        let frames = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| (row, column)))
            .take(limit)
            .map(|(row, column)| FrameRect {
                x: column * frame_width,
                y: row * frame_height,
                width: frame_width,
                height: frame_height,
            })
            .collect();
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[FrameRect] {
        &self.frames
    }
}

impl FrameSource for GridSheet {
    type Frame = FrameRect;

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, index: usize) -> Option<&FrameRect> {
        self.frames.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_row_major() {
        let sheet = GridSheet::new(64, 32, 32, 16).unwrap();
        assert_eq!(sheet.frame_count(), 4);
        assert_eq!(
            sheet.frame(1),
            Some(&FrameRect {
                x: 32,
                y: 0,
                width: 32,
                height: 16
            })
        );
        assert_eq!(
            sheet.frame(2),
            Some(&FrameRect {
                x: 0,
                y: 16,
                width: 32,
                height: 16
            })
        );
        assert_eq!(sheet.frame(4), None);
    }

    #[test]
    fn grid_drops_partial_cells_and_honours_count() {
        let sheet = GridSheet::new(70, 40, 32, 16).unwrap();
        assert_eq!(sheet.frame_count(), 4);

        let sheet = GridSheet::with_count(64, 32, 32, 16, Some(3)).unwrap();
        assert_eq!(sheet.frame_count(), 3);
        assert_eq!(sheet.frames().last().map(|r| (r.x, r.y)), Some((0, 16)));
    }

    #[test]
    fn grid_rejects_zero_sized_cells() {
        assert_eq!(
            GridSheet::new(64, 32, 0, 16),
            Err(SpriteError::InvalidFrameSize {
                width: 0,
                height: 16
            })
        );
        let err = GridSheet::new(64, 32, 32, 0).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn grid_rejects_oversized_grids() {
        assert_eq!(
            GridSheet::new(u32::MAX, u32::MAX, 1, 1),
            Err(SpriteError::GridTooLarge {
                columns: u32::MAX,
                rows: u32::MAX
            })
        );
    }

    #[test]
    fn grid_rejects_empty_sheets() {
        assert!(GridSheet::new(16, 16, 32, 32).is_err());
        assert!(GridSheet::with_count(64, 32, 32, 16, Some(0)).is_err());
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |frame: &u32| -> Result<(), SpriteError> {
                seen.push(*frame);
                Ok(())
            };
            sink.render(&4u32).unwrap();
            sink.render(&5u32).unwrap();
        }
        assert_eq!(seen, vec![4, 5]);
    }

    #[test]
    fn recorder_keeps_render_order() {
        let mut recorder = RecordingSink::new();
        recorder.render(&"a").unwrap();
        recorder.render(&"b").unwrap();
        assert_eq!(recorder.rendered(), &["a", "b"]);
        assert_eq!(recorder.last(), Some(&"b"));
        assert_eq!(recorder.render_count(), 2);
    }

    #[test]
    fn slices_and_vecs_are_sources() {
        let frames = vec![10, 20, 30];
        assert_eq!(frames.frame_count(), 3);
        let slice: &[i32] = &frames;
        assert_eq!(slice.frame(2), Some(&30));
        assert_eq!(slice.frame(3), None);
    }
}
