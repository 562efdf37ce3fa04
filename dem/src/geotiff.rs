//! GeoTIFF elevation tiles.
//!
//! Only the georeferencing tags needed to place a north-up (or
//! affine) grid are read:
//!
//! 1. `ModelPixelScaleTag` (33550) + `ModelTiepointTag` (33922), or
//! 1. `ModelTransformationTag` (34264).
//!
//! `GDAL_NODATA` (42113) provides the no-data sentinel.

use crate::{DemError, GeoTransform, Raster};
use std::{
    io::{Read, Seek, Write},
    path::Path,
};
use tiff::{
    decoder::{Decoder, DecodingResult, Limits},
    encoder::{colortype::Gray32Float, TiffEncoder},
    tags::Tag,
};

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GDAL_NODATA: u16 = 42113;

/// 1/3 arc-second NED tiles are 10812 x 10812 f32 samples (~470MB).
const DECODE_LIMIT: usize = 1024 * 1024 * 1024;

pub(crate) fn decode<R: Read + Seek>(reader: R, path: &Path) -> Result<Raster, DemError> {
    let mut limits = Limits::default();
    limits.decoding_buffer_size = DECODE_LIMIT;
    limits.intermediate_buffer_size = DECODE_LIMIT;
    limits.ifd_value_size = DECODE_LIMIT;
    let mut decoder = Decoder::new(reader)?.with_limits(limits);

    let (width, height) = decoder.dimensions()?;
    let transform = read_transform(&mut decoder)
        .ok_or_else(|| DemError::NoGeoTransform(path.to_owned()))??;
    let no_data = read_no_data(&mut decoder);
    let samples = decode_samples(decoder.read_image()?);

    Raster::new(
        height as usize,
        width as usize,
        samples,
        transform,
        no_data,
    )
}

pub(crate) fn encode<W: Write + Seek>(raster: &Raster, writer: W) -> Result<(), DemError> {
    let (rows, cols) = raster.dimensions();
    let mut encoder = TiffEncoder::new(writer)?;
    #[allow(clippy::cast_possible_truncation)]
    let mut image = encoder.new_image::<Gray32Float>(cols as u32, rows as u32)?;

    let [x0, a, b, y0, d, e] = raster.transform().to_gdal();
    if b == 0.0 && d == 0.0 {
        let scale = [a, -e, 0.0];
        let tiepoint = [0.0, 0.0, 0.0, x0, y0, 0.0];
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE), &scale[..])?;
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(MODEL_TIEPOINT), &tiepoint[..])?;
    } else {
        #[rustfmt::skip]
        let matrix = [
            a,   b,   0.0, x0,
            d,   e,   0.0, y0,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(MODEL_TRANSFORMATION), &matrix[..])?;
    }

    if let Some(no_data) = raster.no_data() {
        let no_data = no_data.to_string();
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(GDAL_NODATA), no_data.as_str())?;
    }

    image.write_data(raster.samples())?;
    Ok(())
}

/// Returns `None` when the file carries no georeferencing at all.
fn read_transform<R: Read + Seek>(
    decoder: &mut Decoder<R>,
) -> Option<Result<GeoTransform, DemError>> {
    let scale = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE));
    let tiepoint = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT));
    if let (Ok(scale), Ok(tiepoint)) = (scale, tiepoint) {
        if scale.len() >= 2 && tiepoint.len() >= 6 {
            // Tiepoint format: [i, j, k, x, y, z] where (i, j) is the
            // raster position of geographic (x, y).
            let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
            let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
            return Some(GeoTransform::from_gdal([
                origin_x, scale[0], 0.0, origin_y, 0.0, -scale[1],
            ]));
        }
    }

    let matrix = decoder
        .get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TRANSFORMATION))
        .ok()?;
    if matrix.len() < 16 {
        return None;
    }
    Some(GeoTransform::from_gdal([
        matrix[3], matrix[0], matrix[1], matrix[7], matrix[4], matrix[5],
    ]))
}

fn read_no_data<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f32> {
    decoder
        .get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_NODATA))
        .ok()
        .and_then(|s| s.trim_matches(char::from(0)).trim().parse().ok())
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn decode_samples(result: DecodingResult) -> Vec<f32> {
    match result {
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use crate::{GeoTransform, Raster};
    use geo::geometry::Coord;
    use std::{io::Cursor, path::Path};

    fn roundtrip(raster: &Raster) -> Raster {
        let mut buf = Vec::new();
        encode(raster, Cursor::new(&mut buf)).unwrap();
        decode(Cursor::new(buf), Path::new("mem.tif")).unwrap()
    }

    #[test]
    fn test_north_up_tags() {
        let transform =
            GeoTransform::north_up(Coord { x: -122.5, y: 47.5 }, 0.001, 0.002).unwrap();
        let samples = (0..12).map(|v| v as f32).collect();
        let raster = Raster::new(3, 4, samples, transform, Some(-9999.0)).unwrap();
        let decoded = roundtrip(&raster);
        assert_eq!(decoded.dimensions(), (3, 4));
        assert_eq!(decoded.transform(), &transform);
        assert_eq!(decoded.no_data(), Some(-9999.0));
        assert_eq!(decoded.get(2, 3), Some(11.0));
    }

    #[test]
    fn test_affine_tags() {
        let transform = GeoTransform::from_gdal([10.0, 1.0, 0.25, 20.0, 0.5, -1.0]).unwrap();
        let raster = Raster::new(2, 2, vec![1.0, 2.0, 3.0, 4.0], transform, None).unwrap();
        let decoded = roundtrip(&raster);
        assert_eq!(decoded.transform().to_gdal(), transform.to_gdal());
        assert_eq!(decoded.no_data(), None);
    }

    #[test]
    fn test_missing_georeference() {
        let mut buf = Vec::new();
        {
            let mut encoder = tiff::encoder::TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
            encoder
                .write_image::<tiff::encoder::colortype::Gray32Float>(1, 1, &[0.0])
                .unwrap();
        }
        assert!(decode(Cursor::new(buf), Path::new("bare.tif")).is_err());
    }
}
