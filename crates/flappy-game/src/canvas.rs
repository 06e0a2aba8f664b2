use ht16k33_matrix::{MatrixArray, RegisterBus};

/// Drawing surface the game renders to once per tick.
#[allow(async_fn_in_trait)]
pub trait Canvas {
    fn set_pixel(&mut self, x: i32, y: i32, on: bool);

    /// Push buffered changes to the display.
    async fn update(&mut self);

    /// Blank the display.
    async fn clear(&mut self);
}

impl<B: RegisterBus, const N: usize> Canvas for MatrixArray<'_, B, N> {
    fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        MatrixArray::set_pixel(self, x, y, on)
    }

    async fn update(&mut self) {
        MatrixArray::update(self).await
    }

    async fn clear(&mut self) {
        MatrixArray::clear(self).await
    }
}
