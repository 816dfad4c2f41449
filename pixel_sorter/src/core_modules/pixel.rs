// THEORY:
// The `Pixel` module is the most fundamental unit of the sorter. It is a "dumb"
// data container for a single RGBA value plus the one single-pixel heuristic the
// engine needs: total intensity. Anything that needs a second pixel (distances,
// run breaks) lives in `smart_pixel`.
//
// Channels are stored at 16 bits. Decoded images are always widened to RGBA16,
// so every constant in the engine (notably the self-bias noise) is expressed in
// a 0..=65535 channel space regardless of the source's bit depth. Pixels are
// read and overwritten wholesale; nothing ever mutates a single channel in place.

pub mod pixel {
    pub type Channel = u16;
    pub type Intensity = u32;

    const CHANNELS: usize = 4;

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Pixel {
        /// The red channel value (0-65535).
        pub red: Channel,
        /// The green channel value (0-65535).
        pub green: Channel,
        /// The blue channel value (0-65535).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-65535).
        pub alpha: Channel,
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// Builds an opaque pixel from 8-bit channel values, widened the same way
        /// the image decoder widens them (v * 257).
        pub const fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
            Pixel::new(
                red as Channel * 257,
                green as Channel * 257,
                blue as Channel * 257,
                Channel::MAX,
            )
        }

        pub fn channels(&self) -> [Channel; CHANNELS] {
            [self.red, self.green, self.blue, self.alpha]
        }

        /// Total intensity: the sum of all four channels, alpha included.
        /// This is the sort key of the run sorter (brighter first).
        pub fn intensity(&self) -> Intensity {
            self.channels().iter().map(|&c| c as Intensity).sum()
        }
    }

    impl From<image::Rgba<Channel>> for Pixel {
        fn from(rgba: image::Rgba<Channel>) -> Self {
            let [red, green, blue, alpha] = rgba.0;
            Pixel::new(red, green, blue, alpha)
        }
    }

    impl From<Pixel> for image::Rgba<Channel> {
        fn from(pixel: Pixel) -> Self {
            image::Rgba(pixel.channels())
        }
    }
}
